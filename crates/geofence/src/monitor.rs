//! Geofence monitor driving the safety gate

use chase_driver::SafetyGate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fence::{GeoPoint, Geofence};

/// Where the latest fix put the rover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceStatus {
    Inside,
    Outside,
    /// No fence installed; the gate is left alone
    Unfenced,
}

/// Applies GPS fixes to the safety gate
pub struct GeofenceMonitor {
    fence: Option<Geofence>,
    gate: SafetyGate,
    last_status: FenceStatus,
}

impl GeofenceMonitor {
    pub fn new(gate: SafetyGate) -> Self {
        Self {
            fence: None,
            gate,
            last_status: FenceStatus::Unfenced,
        }
    }

    pub fn with_fence(fence: Geofence, gate: SafetyGate) -> Self {
        let mut monitor = Self::new(gate);
        monitor.set_fence(Some(fence));
        monitor
    }

    /// Install or remove the fence. Removing it releases the gate.
    pub fn set_fence(&mut self, fence: Option<Geofence>) {
        if fence.is_none() && self.fence.is_some() {
            info!("Geofence removed");
            self.gate.release();
            self.last_status = FenceStatus::Unfenced;
        }
        self.fence = fence;
    }

    pub fn fence(&self) -> Option<&Geofence> {
        self.fence.as_ref()
    }

    pub fn last_status(&self) -> FenceStatus {
        self.last_status
    }

    /// Engage the gate outside the fence, release it inside
    pub fn update(&mut self, fix: GeoPoint) -> FenceStatus {
        let status = match &self.fence {
            None => FenceStatus::Unfenced,
            Some(fence) if fence.contains(&fix) => {
                self.gate.release();
                FenceStatus::Inside
            }
            Some(_) => {
                self.gate.engage();
                FenceStatus::Outside
            }
        };

        if status != self.last_status {
            match status {
                FenceStatus::Outside => warn!(
                    "Rover left the geofence at ({}, {})",
                    fix.latitude, fix.longitude
                ),
                _ => info!("Geofence status {:?} -> {:?}", self.last_status, status),
            }
        }
        self.last_status = status;
        status
    }
}

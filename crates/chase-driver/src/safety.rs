//! Geofence safety latch

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

/// Shared latch forcing the driver to output (0, 0) while engaged
///
/// Clones share the same flag, so the geofence task can hold one handle
/// while the driver reads another. Reads may lag a toggle by one frame.
#[derive(Debug, Clone, Default)]
pub struct SafetyGate {
    engaged: Arc<AtomicBool>,
}

impl SafetyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the robot. Idempotent.
    pub fn engage(&self) {
        if !self.engaged.swap(true, Ordering::AcqRel) {
            warn!("Safety gate engaged: drive output forced to zero");
        }
    }

    /// Allow driving again. Idempotent.
    pub fn release(&self) {
        if self.engaged.swap(false, Ordering::AcqRel) {
            info!("Safety gate released");
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }
}

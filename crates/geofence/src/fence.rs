//! Fence geometry

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::GeofenceError;

/// GPS fix in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Axis-aligned latitude/longitude region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl Geofence {
    /// Smallest region covering all samples
    pub fn from_samples(samples: &[GeoPoint]) -> Result<Self, GeofenceError> {
        let first = samples.first().ok_or(GeofenceError::NoSamples)?;

        let mut fence = Self {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_long: first.longitude,
            max_long: first.longitude,
        };
        for p in samples {
            if !p.is_valid() {
                return Err(GeofenceError::InvalidSample {
                    latitude: p.latitude,
                    longitude: p.longitude,
                });
            }
            fence.min_lat = fence.min_lat.min(p.latitude);
            fence.max_lat = fence.max_lat.max(p.latitude);
            fence.min_long = fence.min_long.min(p.longitude);
            fence.max_long = fence.max_long.max(p.longitude);
        }

        if fence.min_lat >= fence.max_lat || fence.min_long >= fence.max_long {
            return Err(GeofenceError::Degenerate);
        }

        info!(
            "Geofence built from {} samples: lat [{}, {}], long [{}, {}]",
            samples.len(),
            fence.min_lat,
            fence.max_lat,
            fence.min_long,
            fence.max_long
        );
        Ok(fence)
    }

    /// Strictly inside the region; fixes on the boundary count as outside
    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.latitude > self.min_lat
            && p.latitude < self.max_lat
            && p.longitude > self.min_long
            && p.longitude < self.max_long
    }
}

/// Collects fixes while the operator walks the permitted area's corners
#[derive(Debug, Clone, Default)]
pub struct FenceRecorder {
    samples: Vec<GeoPoint>,
}

impl FenceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fix: GeoPoint) {
        debug!("Recorded fence sample ({}, {})", fix.latitude, fix.longitude);
        self.samples.push(fix);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples and start over
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn build(&self) -> Result<Geofence, GeofenceError> {
        Geofence::from_samples(&self.samples)
    }
}

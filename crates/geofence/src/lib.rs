//! Geofence
//!
//! Keeps the rover inside a surveyed area:
//! - Record GPS fixes at the corners of the permitted area
//! - Build a latitude/longitude bounding region from them
//! - Engage the drive safety gate whenever a fix falls outside

mod fence;
mod monitor;

pub use fence::{FenceRecorder, GeoPoint, Geofence};
pub use monitor::{FenceStatus, GeofenceMonitor};

use thiserror::Error;

/// Geofence error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeofenceError {
    #[error("No GPS samples recorded")]
    NoSamples,

    #[error("Invalid GPS sample: ({latitude}, {longitude})")]
    InvalidSample { latitude: f64, longitude: f64 },

    #[error("Recorded samples span no area")]
    Degenerate,
}

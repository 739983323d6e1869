//! Terrain drive profiles

use serde::{Deserialize, Serialize};
use crate::DriverError;

/// Surface the rover is driving on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    #[default]
    Carpet,
}

/// Immutable PID gains and deadband thresholds for one terrain
///
/// Rotation integral and derivative gains are fixed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileValues", into = "ProfileValues")]
pub struct DriveProfile {
    forward_kp: f64,
    forward_ki: f64,
    rot_kp: f64,
    forward_threshold: f64,
    rot_threshold: f64,
}

/// Unvalidated profile fields as they appear in configuration files
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfileValues {
    pub forward_kp: f64,
    pub forward_ki: f64,
    pub rot_kp: f64,
    pub forward_threshold: f64,
    pub rot_threshold: f64,
}

impl DriveProfile {
    /// Build a profile, rejecting negative gains and thresholds outside [0, 1]
    pub fn new(
        forward_kp: f64,
        forward_ki: f64,
        rot_kp: f64,
        forward_threshold: f64,
        rot_threshold: f64,
    ) -> Result<Self, DriverError> {
        for (field, value) in [
            ("forward_kp", forward_kp),
            ("forward_ki", forward_ki),
            ("rot_kp", rot_kp),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DriverError::InvalidProfile {
                    field,
                    value,
                    reason: "gain must be finite and non-negative",
                });
            }
        }
        for (field, value) in [
            ("forward_threshold", forward_threshold),
            ("rot_threshold", rot_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DriverError::InvalidProfile {
                    field,
                    value,
                    reason: "threshold must lie in [0, 1]",
                });
            }
        }

        Ok(Self {
            forward_kp,
            forward_ki,
            rot_kp,
            forward_threshold,
            rot_threshold,
        })
    }

    /// Outdoor grass: high rolling resistance, needs more power to move
    pub fn grass() -> Self {
        Self {
            forward_kp: 0.001,
            forward_ki: 0.000_000_001,
            rot_kp: 0.08,
            forward_threshold: 0.5,
            rot_threshold: 0.75,
        }
    }

    /// Indoor carpet
    pub fn carpet() -> Self {
        Self {
            forward_kp: 0.0001,
            forward_ki: 0.000_000_001,
            rot_kp: 0.0075,
            forward_threshold: 0.2,
            rot_threshold: 0.1,
        }
    }

    pub fn for_terrain(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Grass => Self::grass(),
            Terrain::Carpet => Self::carpet(),
        }
    }

    pub fn forward_kp(&self) -> f64 {
        self.forward_kp
    }

    pub fn forward_ki(&self) -> f64 {
        self.forward_ki
    }

    pub fn rot_kp(&self) -> f64 {
        self.rot_kp
    }

    /// Forward outputs at or below this are snapped to zero
    pub fn forward_threshold(&self) -> f64 {
        self.forward_threshold
    }

    /// Rotation outputs within +/- this are snapped to zero
    pub fn rot_threshold(&self) -> f64 {
        self.rot_threshold
    }
}

impl Default for DriveProfile {
    fn default() -> Self {
        Self::for_terrain(Terrain::default())
    }
}

impl TryFrom<ProfileValues> for DriveProfile {
    type Error = DriverError;

    fn try_from(v: ProfileValues) -> Result<Self, Self::Error> {
        Self::new(v.forward_kp, v.forward_ki, v.rot_kp, v.forward_threshold, v.rot_threshold)
    }
}

impl From<DriveProfile> for ProfileValues {
    fn from(p: DriveProfile) -> Self {
        Self {
            forward_kp: p.forward_kp,
            forward_ki: p.forward_ki,
            rot_kp: p.rot_kp,
            forward_threshold: p.forward_threshold,
            rot_threshold: p.rot_threshold,
        }
    }
}

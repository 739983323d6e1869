//! Driver tunables

use serde::{Deserialize, Serialize};
use vision_targets::SelectorConfig;

use crate::DriverError;

/// Tuning constants fixed at driver construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Target class, small-box threshold and image center row
    pub selector: SelectorConfig,

    /// Frames a lost target's command is held before falling through
    pub max_grace_frames: u32,

    /// Idle frames required before a rotate-in-place sweep
    pub idle_threshold: u32,

    /// Rotate-in-place sweeps allowed until the next chase
    pub max_rotation_attempts: u32,

    /// Added to the forward threshold when crawling toward a small box
    pub approach_boost: f64,

    /// Added to the rotation threshold when sweeping in place
    pub rotate_boost: f64,

    /// Image column the robot is aligned with (pixels)
    pub image_center_pixel_x: f64,

    /// Real-world length of the target (inches), used for pixel scaling
    pub target_reference_length: f64,

    /// Target box area the forward loop drives toward (px^2)
    pub size_setpoint: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            selector: SelectorConfig::default(),
            max_grace_frames: 7,
            idle_threshold: 200,
            max_rotation_attempts: 50,
            approach_boost: 0.3,
            rotate_boost: 0.2,
            image_center_pixel_x: 340.0,
            target_reference_length: 27.0,
            size_setpoint: 100_000.0,
        }
    }
}

impl DriverConfig {
    /// Reject values the control loop cannot work with
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.selector.target_label.trim().is_empty() {
            return Err(invalid("selector.target_label", "must not be empty"));
        }
        if self.selector.small_box_threshold < 0 {
            return Err(invalid("selector.small_box_threshold", "must be non-negative"));
        }
        if !self.selector.image_center_pixel_y.is_finite() {
            return Err(invalid("selector.image_center_pixel_y", "must be finite"));
        }
        if !self.image_center_pixel_x.is_finite() {
            return Err(invalid("image_center_pixel_x", "must be finite"));
        }
        if !self.target_reference_length.is_finite() || self.target_reference_length <= 0.0 {
            return Err(invalid("target_reference_length", "must be positive"));
        }
        if !self.size_setpoint.is_finite() || self.size_setpoint < 0.0 {
            return Err(invalid("size_setpoint", "must be non-negative"));
        }
        for (field, value) in [
            ("approach_boost", self.approach_boost),
            ("rotate_boost", self.rotate_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be non-negative"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> DriverError {
    DriverError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

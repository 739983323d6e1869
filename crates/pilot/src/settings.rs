//! Pilot settings loaded from file and environment

use chase_driver::{DriveProfile, DriverConfig, Terrain};
use config::{Config, ConfigError, Environment, File, FileFormat};
use geofence::{GeoPoint, Geofence, GeofenceError};
use serde::{Deserialize, Serialize};
use tracing::info;
use vision_targets::LabelConfig;

/// Everything the pilot needs to run a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotSettings {
    /// Max tracing level ("trace" .. "error")
    pub log_level: String,

    /// Terrain preset used when no explicit profile is given
    pub terrain: Terrain,

    /// Explicit gains, overriding the terrain preset
    pub profile: Option<DriveProfile>,

    pub driver: DriverConfig,
    pub labels: LabelConfig,

    /// Corner fixes of the permitted area; empty means unfenced
    pub geofence: Vec<GeoPoint>,
}

impl Default for PilotSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            terrain: Terrain::default(),
            profile: None,
            driver: DriverConfig::default(),
            labels: LabelConfig::default(),
            geofence: Vec::new(),
        }
    }
}

impl PilotSettings {
    /// Load from an optional file, overridden by `GOOSE_*` environment
    /// variables (`GOOSE_DRIVER__IDLE_THRESHOLD=100`)
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("GOOSE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn drive_profile(&self) -> DriveProfile {
        match self.profile {
            Some(profile) => profile,
            None => {
                info!("Using {:?} drive profile", self.terrain);
                DriveProfile::for_terrain(self.terrain)
            }
        }
    }

    /// Fence built from the configured corner fixes, if any
    pub fn fence(&self) -> Result<Option<Geofence>, GeofenceError> {
        if self.geofence.is_empty() {
            return Ok(None);
        }
        Geofence::from_samples(&self.geofence).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PilotSettings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.drive_profile(), DriveProfile::carpet());
        assert_eq!(settings.fence().unwrap(), None);
    }

    #[test]
    fn test_from_toml() {
        let settings = PilotSettings::from_toml(
            r#"
log_level = "debug"
terrain = "grass"

[driver]
idle_threshold = 50
approach_boost = 0.25

[[geofence]]
latitude = 10.0
longitude = 20.0

[[geofence]]
latitude = 11.0
longitude = 21.0
"#,
        )
        .unwrap();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.drive_profile(), DriveProfile::grass());
        assert_eq!(settings.driver.idle_threshold, 50);
        assert_eq!(settings.driver.approach_boost, 0.25);
        assert_eq!(settings.driver.max_grace_frames, 7);

        let fence = settings.fence().unwrap().unwrap();
        assert!(fence.contains(&GeoPoint::new(10.5, 20.5)));
    }

    #[test]
    fn test_explicit_profile_overrides_terrain() {
        let settings = PilotSettings::from_toml(
            r#"
terrain = "grass"

[profile]
forward_kp = 0.002
forward_ki = 0.0
rot_kp = 0.05
forward_threshold = 0.3
rot_threshold = 0.2
"#,
        )
        .unwrap();
        let profile = settings.drive_profile();
        assert_eq!(profile.forward_kp(), 0.002);
        assert_eq!(profile.rot_threshold(), 0.2);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let result = PilotSettings::from_toml(
            r#"
[profile]
forward_kp = -1.0
forward_ki = 0.0
rot_kp = 0.05
forward_threshold = 0.3
rot_threshold = 0.2
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_single_point_fence_is_error() {
        let settings = PilotSettings {
            geofence: vec![GeoPoint::new(1.0, 1.0)],
            ..Default::default()
        };
        assert!(settings.fence().is_err());
    }
}

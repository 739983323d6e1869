//! Chase Driver
//!
//! Vision-guided drive control for the goose-chasing rover:
//! - Terrain drive profiles (PID gains and deadband thresholds)
//! - Chase / grace-hold / explore / idle behavior state machine
//! - Forward (box size) and rotation (center offset) PID loops
//! - Safety gate latched by the geofence

pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod profile;
pub mod safety;
pub mod state;

pub use command::DriveCommand;
pub use config::DriverConfig;
pub use driver::Driver;
pub use error::DriverError;
pub use profile::{DriveProfile, Terrain};
pub use safety::SafetyGate;
pub use state::{DriveMode, DriverSnapshot, FrameStatistics, PreviousCommand};

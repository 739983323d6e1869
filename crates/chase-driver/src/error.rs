//! Driver configuration errors

use pid_loop::PidError;
use thiserror::Error;

/// Errors raised while building a [`crate::Driver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    #[error("Invalid drive profile: {field} = {value} ({reason})")]
    InvalidProfile {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Configuration error: {field} ({reason})")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("PID setup failed: {0}")]
    Pid(#[from] PidError),
}

//! PID Error Types

use thiserror::Error;

/// Errors raised while configuring a PID loop
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PidError {
    /// Lower output limit above the upper one
    #[error("Invalid output limits: min {min} > max {max}")]
    InvertedLimits { min: f64, max: f64 },

    /// NaN gain or limit, or an infinite gain
    #[error("Invalid {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

//! Detection input errors

use thiserror::Error;

/// Malformed detection. Such boxes are skipped, never surfaced as faults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Box has non-positive width {0}")]
    NonPositiveWidth(i64),

    #[error("Box has non-positive height {0}")]
    NonPositiveHeight(i64),

    #[error("Confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

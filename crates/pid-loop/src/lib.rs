//! PID Feedback Loop
//!
//! Proportional-integral-derivative controller with output clamping and
//! integral anti-windup. Elapsed time is taken from caller-supplied frame
//! timestamps so replays of the same frame sequence are deterministic.

mod controller;
mod error;

pub use controller::{PidController, PidState};
pub use error::PidError;

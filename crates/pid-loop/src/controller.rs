//! PID Controller Implementation

use crate::error::PidError;
use tracing::{trace, warn};

/// Nanoseconds per second, for converting frame timestamps
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Accumulator and previous-sample memory of a [`PidController`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    pub integral: f64,
    pub prev_error: Option<f64>,
    pub prev_timestamp_ns: Option<u64>,
}

/// Clamped PID loop driving a measurement toward a setpoint
///
/// Output is unbounded until [`PidController::set_output_limits`] is called.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    output_min: f64,
    output_max: f64,
    /// Accumulated error over time (error · seconds)
    integral: f64,
    /// Error seen on the previous sample
    prev_error: Option<f64>,
    /// Timestamp of the previous sample (ns)
    prev_timestamp_ns: Option<u64>,
}

impl PidController {
    /// Create a new controller with the given gains
    pub fn new(kp: f64, ki: f64, kd: f64) -> Result<Self, PidError> {
        let mut pid = Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            integral: 0.0,
            prev_error: None,
            prev_timestamp_ns: None,
        };
        pid.configure(kp, ki, kd)?;
        Ok(pid)
    }

    /// Replace the proportional, integral and derivative gains
    pub fn configure(&mut self, kp: f64, ki: f64, kd: f64) -> Result<(), PidError> {
        for (field, value) in [("kp", kp), ("ki", ki), ("kd", kd)] {
            if !value.is_finite() {
                return Err(PidError::NonFinite { field, value });
            }
        }
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        Ok(())
    }

    /// Set the value the loop drives the measurement toward
    pub fn set_setpoint(&mut self, setpoint: f64) -> Result<(), PidError> {
        if !setpoint.is_finite() {
            return Err(PidError::NonFinite { field: "setpoint", value: setpoint });
        }
        self.setpoint = setpoint;
        Ok(())
    }

    /// Current setpoint
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Clamp the output to `[min, max]`
    ///
    /// The integral term is held inside the same band.
    pub fn set_output_limits(&mut self, min: f64, max: f64) -> Result<(), PidError> {
        if min.is_nan() {
            return Err(PidError::NonFinite { field: "output_min", value: min });
        }
        if max.is_nan() {
            return Err(PidError::NonFinite { field: "output_max", value: max });
        }
        if min > max {
            return Err(PidError::InvertedLimits { min, max });
        }
        self.output_min = min;
        self.output_max = max;
        self.integral = self.bounded_integral(self.integral);
        Ok(())
    }

    /// Loop memory carried between samples
    pub fn state(&self) -> PidState {
        PidState {
            integral: self.integral,
            prev_error: self.prev_error,
            prev_timestamp_ns: self.prev_timestamp_ns,
        }
    }

    /// Output limits as `(min, max)`
    pub fn output_limits(&self) -> (f64, f64) {
        (self.output_min, self.output_max)
    }

    /// Compute the next output for `measurement` sampled at `timestamp_ns`
    ///
    /// The derivative term is zero on the first sample and whenever no time
    /// has elapsed since the previous one. A non-finite measurement leaves
    /// the loop state untouched and yields the neutral output.
    pub fn compute(&mut self, measurement: f64, timestamp_ns: u64) -> f64 {
        if !measurement.is_finite() {
            warn!("Ignoring non-finite PID measurement: {}", measurement);
            return 0.0_f64.clamp(self.output_min, self.output_max);
        }

        let error = self.setpoint - measurement;
        let dt = match self.prev_timestamp_ns {
            Some(prev) if timestamp_ns > prev => (timestamp_ns - prev) as f64 / NANOS_PER_SEC,
            _ => 0.0,
        };

        if self.ki != 0.0 {
            self.integral = self.bounded_integral(self.integral + error * dt);
        }

        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };

        self.prev_error = Some(error);
        self.prev_timestamp_ns = Some(timestamp_ns);

        let raw = self.kp * error + self.ki * self.integral + self.kd * derivative;
        let output = raw.clamp(self.output_min, self.output_max);
        trace!(error, dt, integral = self.integral, derivative, raw, output, "pid sample");
        output
    }

    /// Keep `ki · integral` inside the output band
    fn bounded_integral(&self, integral: f64) -> f64 {
        if self.ki == 0.0 {
            return integral;
        }
        let a = self.output_min / self.ki;
        let b = self.output_max / self.ki;
        integral.clamp(a.min(b), a.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME_NS: u64 = 33_000_000;

    #[test]
    fn test_proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0).unwrap();
        pid.set_setpoint(10.0).unwrap();

        // error = 10 - 4 = 6
        let output = pid.compute(4.0, 0);
        assert!((output - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = PidController::new(100.0, 0.0, 0.0).unwrap();
        pid.set_setpoint(1.0).unwrap();
        pid.set_output_limits(-1.0, 1.0).unwrap();

        assert_eq!(pid.compute(0.0, 0), 1.0);
        assert_eq!(pid.compute(2.0, FRAME_NS), -1.0);
    }

    #[test]
    fn test_first_sample_has_no_derivative_kick() {
        let mut pid = PidController::new(0.0, 0.0, 10.0).unwrap();
        pid.set_setpoint(1000.0).unwrap();

        // Large error on the first call must not produce a derivative spike
        assert_eq!(pid.compute(0.0, 5 * FRAME_NS), 0.0);

        // Error shrinks by 100 over one second -> derivative = -100
        let output = pid.compute(100.0, 5 * FRAME_NS + 1_000_000_000);
        assert!((output + 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_timestamp_contributes_no_time() {
        let mut pid = PidController::new(0.0, 1.0, 1.0).unwrap();
        pid.set_setpoint(5.0).unwrap();

        pid.compute(0.0, 1_000);
        // Same timestamp: dt = 0, so neither integral nor derivative move
        assert_eq!(pid.compute(3.0, 1_000), 0.0);
    }

    #[test]
    fn test_integral_accumulates_over_elapsed_time() {
        let mut pid = PidController::new(0.0, 1.0, 0.0).unwrap();
        pid.set_setpoint(2.0).unwrap();

        assert_eq!(pid.compute(0.0, 0), 0.0);
        // error 2 held for half a second
        let output = pid.compute(0.0, 500_000_000);
        assert!((output - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_integral_windup_bounded() {
        let mut pid = PidController::new(0.0, 1.0, 0.0).unwrap();
        pid.set_setpoint(1000.0).unwrap();
        pid.set_output_limits(0.0, 1.0).unwrap();

        let mut ts = 0;
        for _ in 0..1000 {
            ts += FRAME_NS;
            pid.compute(0.0, ts);
        }
        // Flip the error sign: a wound-up integral would pin the output at 1.0
        pid.set_setpoint(0.0).unwrap();
        ts += FRAME_NS;
        let output = pid.compute(1000.0, ts);
        assert!(output < 1.0);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).unwrap();
        assert_eq!(
            pid.set_output_limits(1.0, -1.0),
            Err(PidError::InvertedLimits { min: 1.0, max: -1.0 })
        );
        assert!(pid.set_output_limits(f64::NAN, 1.0).is_err());
        assert_eq!(pid.output_limits(), (f64::NEG_INFINITY, f64::INFINITY));
    }

    #[test]
    fn test_non_finite_gain_rejected() {
        assert!(PidController::new(f64::NAN, 0.0, 0.0).is_err());
        let mut pid = PidController::new(1.0, 0.0, 0.0).unwrap();
        assert!(pid.configure(1.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_non_finite_setpoint_rejected() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).unwrap();
        pid.set_output_limits(-1.0, 1.0).unwrap();
        pid.set_setpoint(0.5).unwrap();

        assert!(matches!(
            pid.set_setpoint(f64::NAN),
            Err(PidError::NonFinite { field: "setpoint", .. })
        ));
        assert!(pid.set_setpoint(f64::NEG_INFINITY).is_err());
        assert_eq!(pid.setpoint(), 0.5);

        let output = pid.compute(0.0, 0);
        assert!((output - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_state_tracks_last_sample() {
        let mut pid = PidController::new(0.0, 1.0, 0.0).unwrap();
        pid.set_setpoint(2.0).unwrap();
        assert_eq!(pid.state(), PidState::default());

        pid.compute(0.0, 0);
        pid.compute(1.0, 500_000_000);
        let state = pid.state();
        assert!((state.integral - 0.5).abs() < 1e-9);
        assert_eq!(state.prev_error, Some(1.0));
        assert_eq!(state.prev_timestamp_ns, Some(500_000_000));
    }

    #[test]
    fn test_non_finite_measurement_ignored() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).unwrap();
        pid.set_output_limits(-1.0, 1.0).unwrap();
        assert_eq!(pid.compute(f64::NAN, 0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_output_within_limits(
            kp in -10.0f64..10.0,
            ki in -1.0f64..1.0,
            kd in -1.0f64..1.0,
            samples in prop::collection::vec((-1e6f64..1e6, 0u64..100_000_000), 1..50),
        ) {
            let mut pid = PidController::new(kp, ki, kd).unwrap();
            pid.set_output_limits(-1.0, 1.0).unwrap();
            let mut ts = 0u64;
            for (measurement, step) in samples {
                ts += step;
                let output = pid.compute(measurement, ts);
                prop_assert!((-1.0..=1.0).contains(&output));
            }
        }
    }
}

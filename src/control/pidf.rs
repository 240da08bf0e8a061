use serde::{Deserialize, Serialize};

/// Gains of the PIDF control law.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct PidfGains {
    // Proportional gain.
    pub kp: f32,
    // Integral gain.
    pub ki: f32,
    // Derivative gain.
    pub kd: f32,
    // Feed-forward gain applied to the target.
    pub kf: f32,
}

impl PidfGains {
    /// Create the gains from a slice.
    ///
    /// # Arguments
    /// * `values` - Gains in the order of [kp, ki, kd, kf].
    ///
    /// # Returns
    /// New gains.
    ///
    /// # Panics
    /// If the slice does not have exactly four values.
    pub fn from_slice(values: &[f32]) -> Self {
        assert_eq!(values.len(), 4, "The gains should be [kp, ki, kd, kf].");

        Self {
            kp: values[0],
            ki: values[1],
            kd: values[2],
            kf: values[3],
        }
    }
}

/// Proportional-integral-derivative control law with a feed-forward term. The
/// accumulator and the derivative history carry across the calls until the
/// law is reset or replaced.
pub struct Pidf {
    _gains: PidfGains,
    // Time between two calls in seconds.
    _cycle_time: f32,
    _integral: f32,
    _previous_error: f32,
    _has_previous_error: bool,
}

impl Pidf {
    /// Create a new control law with a zeroed accumulator.
    ///
    /// # Arguments
    /// * `gains` - Gains of the law.
    /// * `cycle_time` - Time between two calls in seconds.
    ///
    /// # Returns
    /// A new control law.
    pub fn new(gains: PidfGains, cycle_time: f32) -> Self {
        Self {
            _gains: gains,
            _cycle_time: cycle_time,
            _integral: 0.0,
            _previous_error: 0.0,
            _has_previous_error: false,
        }
    }

    /// Calculate the output.
    ///
    /// # Notes
    /// The law is total over its domain. An out-of-range result is clamped to
    /// the output fraction range instead of failing.
    ///
    /// # Arguments
    /// * `current` - Current value.
    /// * `target` - Target value.
    ///
    /// # Returns
    /// Output fraction in [-1.0, 1.0].
    pub fn calculate(&mut self, current: f32, target: f32) -> f32 {
        let error = target - current;

        self._integral += error * self._cycle_time;

        let derivative = if self._has_previous_error {
            (error - self._previous_error) / self._cycle_time
        } else {
            0.0
        };

        self._previous_error = error;
        self._has_previous_error = true;

        let output = self._gains.kp * error
            + self._gains.ki * self._integral
            + self._gains.kd * derivative
            + self._gains.kf * target;

        output.clamp(-1.0, 1.0)
    }

    /// Reset the accumulated state.
    pub fn reset(&mut self) {
        self._integral = 0.0;
        self._previous_error = 0.0;
        self._has_previous_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn create_pidf() -> Pidf {
        Pidf::new(
            PidfGains {
                kp: 0.5,
                ki: 0.1,
                kd: 0.02,
                kf: 0.05,
            },
            0.01,
        )
    }

    #[test]
    fn test_from_slice() {
        let gains = PidfGains::from_slice(&[4.0, 0.0, 0.1, 0.0]);

        assert_eq!(gains.kp, 4.0);
        assert_eq!(gains.kd, 0.1);
    }

    #[test]
    #[should_panic(expected = "The gains should be [kp, ki, kd, kf].")]
    fn test_from_slice_panic() {
        PidfGains::from_slice(&[4.0, 0.0]);
    }

    #[test]
    fn test_calculate() {
        let mut pidf = create_pidf();

        // First call has no derivative contribution.
        let output = pidf.calculate(0.0, 1.0);
        assert_relative_eq!(output, 0.5 + 0.1 * 0.01 + 0.05, epsilon = 1e-6);

        // Second call with the same error accumulates the integral and has a
        // zero derivative.
        let output = pidf.calculate(0.0, 1.0);
        assert_relative_eq!(output, 0.5 + 0.1 * 0.02 + 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_calculate_clamp() {
        let mut pidf = create_pidf();

        assert_eq!(pidf.calculate(0.0, 100.0), 1.0);
        assert_eq!(pidf.calculate(100.0, 0.0), -1.0);
    }

    #[test]
    fn test_reset() {
        let mut pidf = create_pidf();

        let first = pidf.calculate(0.0, 1.0);
        let _ = pidf.calculate(0.0, 1.0);

        pidf.reset();

        assert_relative_eq!(pidf.calculate(0.0, 1.0), first, epsilon = 1e-6);
    }
}

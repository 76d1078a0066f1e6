use crate::signal_processing::Filter;

/// Logarithmic calibration curve `y = mult * ln(x) + add`
///
/// Maps a raw physical reading (for example a gas sensor resistance) onto an
/// engineering unit (for example a concentration). The curve is clamped at
/// zero: non-positive inputs and negative results both yield `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogarithmicRegressionCalculator {
    add: f32,
    mult: f32,
}

impl LogarithmicRegressionCalculator {
    pub fn new(add: f32, mult: f32) -> Self {
        Self { add, mult }
    }

    /// Evaluate the curve at `x`
    ///
    /// Never returns a negative value or NaN.
    pub fn calc(&self, x: f32) -> f32 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        let y = self.mult * x.ln() + self.add;
        // f32::max ignores a NaN operand.
        y.max(0.0)
    }

    pub fn add(&self) -> f32 {
        self.add
    }

    pub fn mult(&self) -> f32 {
        self.mult
    }
}

impl Filter<f32> for LogarithmicRegressionCalculator {
    fn process(&mut self, sample: f32) -> f32 {
        self.calc(sample)
    }
}

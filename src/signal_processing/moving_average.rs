use crate::constants::MAX_DECIMAL_PLACES;
use crate::error::{Result, SensorError};
use crate::signal_processing::Filter;

/// Numeric kinds accepted by [`MovingAverageCalculator::sample`]
///
/// Every kind is converted to the calculator's internal `i32` representation,
/// averaged by the single integer update path, then converted back. Integer
/// kinds pass through untouched; decimal kinds are carried as fixed-point
/// integers scaled by the calculator's decimal scale.
pub trait Sample: Copy {
    /// Convert into the internal integer representation
    fn to_fixed(self, decimal_scale: i32) -> i32;

    /// Convert an internal integer average back to this kind
    fn from_fixed(fixed: i32, decimal_scale: i32) -> Self;
}

macro_rules! impl_integer_sample {
    ($($ty:ty),*) => {
        $(
            impl Sample for $ty {
                fn to_fixed(self, _decimal_scale: i32) -> i32 {
                    i32::from(self)
                }

                // A window mixing integer kinds can average outside this
                // kind's range; clamp rather than wrap.
                fn from_fixed(fixed: i32, _decimal_scale: i32) -> Self {
                    fixed.clamp(i32::from(<$ty>::MIN), i32::from(<$ty>::MAX)) as $ty
                }
            }
        )*
    };
}

impl_integer_sample!(i16, u16, i32);

macro_rules! impl_decimal_sample {
    ($($ty:ty),*) => {
        $(
            impl Sample for $ty {
                // Rounds half away from zero; out-of-range values saturate.
                fn to_fixed(self, decimal_scale: i32) -> i32 {
                    let scaled = (self * decimal_scale as $ty).round();
                    if scaled > i32::MAX as $ty || scaled < i32::MIN as $ty {
                        log::warn!(
                            "Sample {} saturates at decimal scale {}",
                            self,
                            decimal_scale
                        );
                    }
                    scaled as i32
                }

                fn from_fixed(fixed: i32, decimal_scale: i32) -> Self {
                    fixed as $ty / decimal_scale as $ty
                }
            }
        )*
    };
}

impl_decimal_sample!(f32, f64);

struct WindowState {
    history: Vec<i32>,
    running_total: i64,
    write_cursor: usize,
}

impl WindowState {
    fn filled_with(value: i32, window_size: usize) -> Self {
        Self {
            history: vec![value; window_size],
            running_total: i64::from(value) * window_size as i64,
            write_cursor: 0,
        }
    }

    fn replace_oldest(&mut self, value: i32) {
        self.running_total += i64::from(value);
        self.running_total -= i64::from(self.history[self.write_cursor]);
        self.history[self.write_cursor] = value;
        self.write_cursor = (self.write_cursor + 1) % self.history.len();
    }

    fn average(&self) -> i32 {
        (self.running_total / self.history.len() as i64) as i32
    }
}

/// Bounded-window moving average with optional fixed-point decimal scaling
///
/// Smooths a noisy sensor signal by averaging the last `window_size` samples.
/// The window is pre-filled with the first sample, so the average is defined
/// from the very first call and never has to special-case a partial window.
///
/// The running total is kept exact by adding the incoming sample and
/// subtracting the one it evicts, all in integer arithmetic. Decimal samples
/// are converted to fixed-point integers first, so long uptimes do not
/// accumulate floating-point drift.
///
/// # Example
/// ```
/// use loxone_sensors::signal_processing::MovingAverageCalculator;
///
/// let mut humidity = MovingAverageCalculator::with_decimal_places(4, 2);
/// assert_eq!(humidity.sample(41.5_f32), 41.5);
/// assert_eq!(humidity.sample(43.5_f32), 42.0);
/// ```
pub struct MovingAverageCalculator {
    window_size: usize,
    decimal_scale: i32,
    state: Option<WindowState>,
}

impl MovingAverageCalculator {
    /// Create an integer moving average (no decimal scaling)
    ///
    /// # Panics
    /// Panics if `window_size` is zero.
    pub fn new(window_size: usize) -> Self {
        Self::with_decimal_places(window_size, 0)
    }

    /// Create a moving average preserving `decimal_places` digits of decimal
    /// samples
    ///
    /// # Arguments
    /// * `window_size` - Number of samples averaged (larger = smoother but slower response)
    /// * `decimal_places` - Decimal digits kept when sampling `f32`/`f64` values
    ///
    /// Decimal samples whose scaled value leaves the `i32` range saturate,
    /// so at 6 decimal places readings are limited to about ±2147.48.
    ///
    /// # Panics
    /// Panics if `window_size` is zero or `decimal_places` exceeds
    /// [`MAX_DECIMAL_PLACES`].
    pub fn with_decimal_places(window_size: usize, decimal_places: u32) -> Self {
        assert!(window_size > 0, "moving average window must hold at least one sample");
        assert!(
            decimal_places <= MAX_DECIMAL_PLACES,
            "at most {} decimal places supported, got {}",
            MAX_DECIMAL_PLACES,
            decimal_places
        );
        Self::build(window_size, decimal_places)
    }

    /// Fallible constructor for parameters that come from configuration
    pub fn try_new(window_size: usize, decimal_places: u32) -> Result<Self> {
        if window_size == 0 {
            return Err(SensorError::Config(
                "window_size must be at least 1".to_string(),
            ));
        }
        if decimal_places > MAX_DECIMAL_PLACES {
            return Err(SensorError::Config(format!(
                "decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, decimal_places
            )));
        }
        Ok(Self::build(window_size, decimal_places))
    }

    fn build(window_size: usize, decimal_places: u32) -> Self {
        Self {
            window_size,
            decimal_scale: 10_i32.pow(decimal_places),
            state: None,
        }
    }

    /// Feed one sample and return the smoothed value in the same numeric kind
    pub fn sample<T: Sample>(&mut self, value: T) -> T {
        let fixed = value.to_fixed(self.decimal_scale);
        T::from_fixed(self.new_reading(fixed), self.decimal_scale)
    }

    /// Integer update path shared by every numeric kind
    ///
    /// The first reading fills the whole window. Every later reading replaces
    /// the oldest entry. Returns the truncated integer average.
    pub fn new_reading(&mut self, value: i32) -> i32 {
        if let Some(state) = self.state.as_mut() {
            state.replace_oldest(value);
        } else {
            self.state = Some(WindowState::filled_with(value, self.window_size));
        }
        self.state.as_ref().map_or(value, WindowState::average)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Multiplier applied to decimal samples (`10^decimal_places`)
    pub fn decimal_scale(&self) -> i32 {
        self.decimal_scale
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Exact sum of the window, `None` before the first sample
    pub fn running_total(&self) -> Option<i64> {
        self.state.as_ref().map(|s| s.running_total)
    }

    /// Window contents in storage order, `None` before the first sample
    pub fn history(&self) -> Option<&[i32]> {
        self.state.as_ref().map(|s| s.history.as_slice())
    }

    /// Current integer average without adding a sample
    pub fn current(&self) -> Option<i32> {
        self.state.as_ref().map(WindowState::average)
    }

    /// Forget all samples; the next one re-fills the window
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl<T: Sample> Filter<T> for MovingAverageCalculator {
    fn process(&mut self, sample: T) -> T {
        self.sample(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::VecDeque;

    #[test]
    fn test_first_sample_fills_window() {
        for window in [1, 2, 5, 16] {
            let mut ma = MovingAverageCalculator::new(window);
            assert!(!ma.is_initialized());
            assert_eq!(ma.running_total(), None);

            assert_eq!(ma.sample(37), 37);
            assert_eq!(ma.running_total(), Some(37 * window as i64));
            assert_eq!(ma.history().unwrap(), vec![37; window].as_slice());
        }
    }

    #[test]
    fn test_constant_input_is_steady() {
        let mut ma = MovingAverageCalculator::new(7);
        for _ in 0..50 {
            assert_eq!(ma.sample(-12), -12);
        }
    }

    #[test]
    fn test_running_total_matches_last_window() {
        let window = 5;
        let mut ma = MovingAverageCalculator::new(window);
        let inputs = [3, 9, -4, 17, 0, 22, 8, 8, -30, 41, 5, 6, 7, 1000, -999];

        let mut log: VecDeque<i32> = VecDeque::new();
        for (i, &value) in inputs.iter().enumerate() {
            if i == 0 {
                log.extend(std::iter::repeat_n(value, window));
            } else {
                log.push_back(value);
                log.pop_front();
            }

            let output = ma.sample(value);
            let expected_total: i64 = log.iter().map(|&v| i64::from(v)).sum();
            assert_eq!(ma.running_total(), Some(expected_total));
            assert_eq!(output, (expected_total / window as i64) as i32);
        }
    }

    #[test]
    fn test_integer_truncation() {
        let mut ma = MovingAverageCalculator::new(3);
        assert_eq!(ma.sample(10), 10);
        assert_eq!(ma.sample(20), 13); // (10+10+20)/3
    }

    #[test]
    fn test_negative_average_truncates_toward_zero() {
        let mut ma = MovingAverageCalculator::new(3);
        ma.sample(-10);
        assert_eq!(ma.sample(-20), -13);
    }

    #[test]
    fn test_window_of_one_passes_through() {
        let mut ma = MovingAverageCalculator::new(1);
        for value in [5, 100, -3, 42] {
            assert_eq!(ma.sample(value), value);
        }
    }

    #[test]
    fn test_ramp_sequence() {
        let mut ma = MovingAverageCalculator::new(4);
        assert_eq!(ma.sample(100), 100);
        assert_eq!(ma.sample(120), 105);
        assert_eq!(ma.sample(140), 115); // 460 / 4
        assert_eq!(ma.sample(160), 130); // 520 / 4
        assert_eq!(ma.sample(180), 150); // 600 / 4
    }

    #[test]
    fn test_fixed_point_rounding() {
        let mut ma = MovingAverageCalculator::with_decimal_places(1, 2);
        assert_eq!(ma.decimal_scale(), 100);
        assert_relative_eq!(ma.sample(3.456_f32), 3.46, epsilon = 1e-6);
        assert_eq!(ma.current(), Some(346));
    }

    #[test]
    fn test_fixed_point_negative_rounds_symmetrically() {
        let mut ma = MovingAverageCalculator::with_decimal_places(1, 2);
        assert_relative_eq!(ma.sample(-3.456_f32), -3.46, epsilon = 1e-6);
        assert_relative_eq!(ma.sample(-0.004_f64), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_decimal_without_scaling_rounds_to_integer() {
        let mut ma = MovingAverageCalculator::new(2);
        assert_relative_eq!(ma.sample(20.4_f32), 20.0);
        assert_relative_eq!(ma.sample(23.6_f32), 22.0); // (20 + 24) / 2
    }

    #[test]
    fn test_decimal_average() {
        let mut ma = MovingAverageCalculator::with_decimal_places(4, 1);
        assert_relative_eq!(ma.sample(21.0_f32), 21.0, epsilon = 1e-5);
        // 210*3 + 223 = 853 -> 213 -> 21.3
        assert_relative_eq!(ma.sample(22.3_f32), 21.3, epsilon = 1e-5);
    }

    #[test]
    fn test_integer_kinds_ignore_scale() {
        let mut ma = MovingAverageCalculator::with_decimal_places(2, 3);
        assert_eq!(ma.sample(400_u16), 400);
        assert_eq!(ma.sample(600_u16), 500);
        assert_eq!(ma.sample(-2_i16), 299); // (600 - 2) / 2
    }

    #[test]
    fn test_mixed_integer_kinds_clamp_to_target_range() {
        let mut ma = MovingAverageCalculator::new(3);
        ma.sample(u16::MAX);
        ma.sample(u16::MAX);
        // (65535 * 2 - 1) / 3 = 43689 does not fit in i16
        assert_eq!(ma.sample(-1_i16), i16::MAX);
        assert_eq!(ma.current(), Some(43689));

        let mut ma = MovingAverageCalculator::new(1);
        ma.sample(-5_i16);
        assert_eq!(ma.sample(-7_i16), -7);
        assert_eq!(ma.sample(-9_i32), -9);
        assert_eq!(<u16 as Sample>::from_fixed(-9, 1), 0);
    }

    #[test]
    fn test_scaled_decimal_saturates() {
        let mut ma = MovingAverageCalculator::with_decimal_places(4, 6);
        assert_eq!(ma.current(), None);
        assert_relative_eq!(ma.sample(5000.0_f32), 2147.4836, epsilon = 1e-3);
        assert_eq!(ma.current(), Some(i32::MAX));

        let mut ma = MovingAverageCalculator::with_decimal_places(1, 6);
        assert_relative_eq!(ma.sample(-5000.0_f64), -2147.483648, epsilon = 1e-6);
        assert_eq!(ma.current(), Some(i32::MIN));
    }

    #[test]
    fn test_u16_extremes() {
        let mut ma = MovingAverageCalculator::new(3);
        assert_eq!(ma.sample(u16::MAX), u16::MAX);
        assert_eq!(ma.sample(0_u16), 43690);
    }

    #[test]
    fn test_large_values_do_not_overflow_total() {
        let mut ma = MovingAverageCalculator::new(8);
        assert_eq!(ma.sample(i32::MAX), i32::MAX);
        assert_eq!(ma.sample(i32::MAX), i32::MAX);
    }

    #[test]
    fn test_reset_refills_window() {
        let mut ma = MovingAverageCalculator::new(4);
        ma.sample(10);
        ma.sample(50);
        ma.reset();
        assert!(!ma.is_initialized());
        assert_eq!(ma.sample(80), 80);
        assert_eq!(ma.running_total(), Some(320));
    }

    #[test]
    fn test_process_buffer() {
        let mut ma = MovingAverageCalculator::new(2);
        let mut buffer = [10, 20, 30, 40];
        ma.process_buffer(&mut buffer[..]);
        assert_eq!(buffer, [10, 15, 25, 35]);
    }

    #[test]
    fn test_try_new_rejects_bad_parameters() {
        assert!(MovingAverageCalculator::try_new(0, 0).is_err());
        assert!(MovingAverageCalculator::try_new(4, MAX_DECIMAL_PLACES + 1).is_err());
        assert!(MovingAverageCalculator::try_new(4, MAX_DECIMAL_PLACES).is_ok());
    }

    #[test]
    #[should_panic]
    fn test_zero_window_panics() {
        let _ = MovingAverageCalculator::new(0);
    }
}

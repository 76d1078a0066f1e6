//! Numeric limits shared by the smoothing and calibration code.

/// Largest supported fixed-point precision.
///
/// Scaling by `10^7` would leave too little headroom in the `i32` sample
/// slot for realistic readings, and `f32` only carries about seven
/// significant digits anyway.
pub const MAX_DECIMAL_PLACES: u32 = 6;

/// Window size used when a channel does not specify one.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

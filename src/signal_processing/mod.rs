pub mod filter;
pub mod moving_average;
pub mod regression;

pub use filter::Filter;
pub use moving_average::{MovingAverageCalculator, Sample};
pub use regression::LogarithmicRegressionCalculator;

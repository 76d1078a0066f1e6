pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{ChannelConfig, LogCoefficients, SensorConfig};
pub use error::{Result, SensorError};
pub use processing::{Reading, SensorChannel, SensorProcessor};
pub use signal_processing::{LogarithmicRegressionCalculator, MovingAverageCalculator};

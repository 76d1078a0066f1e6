//! Configuration for the sensor smoothing pipeline.
//!
//! Channels are described in TOML, one `[[channels]]` table per monitored
//! signal:
//!
//! ```toml
//! [[channels]]
//! name = "humidity"
//! window_size = 10
//! decimal_places = 2
//!
//! [[channels]]
//! name = "tvoc"
//! window_size = 30
//!
//! [channels.calibration]
//! add = 1250.0
//! mult = -180.0
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{DEFAULT_WINDOW_SIZE, MAX_DECIMAL_PLACES};
use crate::error::{Result, SensorError};
use crate::signal_processing::LogarithmicRegressionCalculator;

/// Coefficients of a logarithmic calibration curve `y = mult * ln(x) + add`
///
/// # Parsing formats
/// - `add:mult` (e.g. `1250:-180`)
/// - `add,mult`
///
/// # Example
/// ```
/// use loxone_sensors::config::LogCoefficients;
///
/// let coefficients: LogCoefficients = "1250:-180".parse().unwrap();
/// assert_eq!(coefficients.add, 1250.0);
/// assert_eq!(coefficients.mult, -180.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LogCoefficients {
    pub add: f32,
    pub mult: f32,
}

impl LogCoefficients {
    pub fn calculator(&self) -> LogarithmicRegressionCalculator {
        LogarithmicRegressionCalculator::new(self.add, self.mult)
    }
}

impl fmt::Display for LogCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.add, self.mult)
    }
}

impl FromStr for LogCoefficients {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (add, mult) = s
            .split_once(':')
            .or_else(|| s.split_once(','))
            .ok_or_else(|| format!("expected add:mult, got {}", s))?;

        let add: f32 = add
            .trim()
            .parse()
            .map_err(|_| format!("invalid add coefficient: {}", add))?;
        let mult: f32 = mult
            .trim()
            .parse()
            .map_err(|_| format!("invalid mult coefficient: {}", mult))?;

        if !add.is_finite() || !mult.is_finite() {
            return Err("coefficients must be finite".to_string());
        }
        Ok(Self { add, mult })
    }
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// Smoothing and calibration parameters for one signal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelConfig {
    /// Channel name used to route input lines
    pub name: String,
    /// Moving average window size (must be at least 1)
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Decimal digits preserved by fixed-point scaling (0 = integer output)
    #[serde(default)]
    pub decimal_places: u32,
    /// Optional logarithmic calibration applied before smoothing
    #[serde(default)]
    pub calibration: Option<LogCoefficients>,
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>, window_size: usize, decimal_places: u32) -> Self {
        Self {
            name: name.into(),
            window_size,
            decimal_places,
            calibration: None,
        }
    }

    pub fn with_calibration(mut self, coefficients: LogCoefficients) -> Self {
        self.calibration = Some(coefficients);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SensorError::Config("channel name is empty".to_string()));
        }
        if self.window_size == 0 {
            return Err(SensorError::Config(format!(
                "channel {}: window_size must be at least 1",
                self.name
            )));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(SensorError::Config(format!(
                "channel {}: decimal_places must be at most {}, got {}",
                self.name, MAX_DECIMAL_PLACES, self.decimal_places
            )));
        }
        if let Some(c) = &self.calibration {
            if !c.add.is_finite() || !c.mult.is_finite() {
                return Err(SensorError::Config(format!(
                    "channel {}: calibration coefficients must be finite",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Full pipeline configuration
///
/// `SensorConfig::default()` describes the temperature/humidity and VOC
/// readings of a typical SHT31 + SGP30 node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorConfig {
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            channels: vec![
                ChannelConfig::new("temperature", DEFAULT_WINDOW_SIZE, 2),
                ChannelConfig::new("humidity", DEFAULT_WINDOW_SIZE, 2),
                ChannelConfig::new("tvoc", 30, 0),
            ],
        }
    }
}

impl SensorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading sensor configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(SensorError::NoChannels);
        }

        let mut names = HashSet::new();
        for channel in &self.channels {
            channel.validate()?;
            if !names.insert(channel.name.as_str()) {
                return Err(SensorError::Config(format!(
                    "duplicate channel name: {}",
                    channel.name
                )));
            }
        }
        Ok(())
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut ChannelConfig> {
        self.channels.iter_mut().find(|c| c.name == name)
    }
}

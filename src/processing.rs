use serde::Serialize;

use crate::config::{ChannelConfig, SensorConfig};
use crate::error::{Result, SensorError};
use crate::signal_processing::{LogarithmicRegressionCalculator, MovingAverageCalculator};

/// One processed reading, ready to be formatted or packed for the bus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub channel: String,
    pub raw: f32,
    pub value: f32,
}

/// Calibration and smoothing pipeline for a single signal
pub struct SensorChannel {
    name: String,
    calibration: Option<LogarithmicRegressionCalculator>,
    smoother: MovingAverageCalculator,
}

impl SensorChannel {
    pub fn new(config: &ChannelConfig) -> Result<Self> {
        let smoother = MovingAverageCalculator::try_new(config.window_size, config.decimal_places)
            .map_err(|e| match e {
                SensorError::Config(msg) => {
                    SensorError::Config(format!("channel {}: {}", config.name, msg))
                }
                other => other,
            })?;

        log::debug!(
            "Channel {}: window {}, decimal scale {}, calibration {}",
            config.name,
            smoother.window_size(),
            smoother.decimal_scale(),
            config
                .calibration
                .map_or("none".to_string(), |c| c.to_string())
        );

        Ok(Self {
            name: config.name.clone(),
            calibration: config.calibration.map(|c| c.calculator()),
            smoother,
        })
    }

    /// Calibrate (if configured) then smooth one raw reading
    pub fn process(&mut self, raw: f32) -> f32 {
        let calibrated = self.calibration.map_or(raw, |c| c.calc(raw));
        let value = self.smoother.sample(calibrated);
        log::trace!(
            "{}: raw {} -> calibrated {} -> smoothed {}",
            self.name,
            raw,
            calibrated,
            value
        );
        value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn smoother(&self) -> &MovingAverageCalculator {
        &self.smoother
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}

/// Owns one [`SensorChannel`] per configured signal and routes readings
pub struct SensorProcessor {
    channels: Vec<SensorChannel>,
}

impl SensorProcessor {
    pub fn new(config: &SensorConfig) -> Result<Self> {
        config.validate()?;
        let channels = config
            .channels
            .iter()
            .map(SensorChannel::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { channels })
    }

    /// Process one reading; `None` routes to the first configured channel
    pub fn process_reading(&mut self, channel: Option<&str>, raw: f32) -> Result<Reading> {
        let target = match channel {
            Some(name) => self
                .channels
                .iter_mut()
                .find(|c| c.name() == name)
                .ok_or_else(|| SensorError::UnknownChannel(name.to_string()))?,
            None => self.channels.first_mut().ok_or(SensorError::NoChannels)?,
        };

        let value = target.process(raw);
        Ok(Reading {
            channel: target.name().to_string(),
            raw,
            value,
        })
    }

    pub fn process_series(&mut self, channel: Option<&str>, raws: &[f32]) -> Result<Vec<Reading>> {
        raws.iter()
            .map(|&raw| self.process_reading(channel, raw))
            .collect()
    }

    pub fn channel(&self, name: &str) -> Option<&SensorChannel> {
        self.channels.iter().find(|c| c.name() == name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(SensorChannel::name)
    }

    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid reading {line:?}: {reason}")]
    Parse { line: String, reason: String },

    #[error("Unknown sensor channel: {0}")]
    UnknownChannel(String),

    #[error("No sensor channels configured")]
    NoChannels,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SensorError>;

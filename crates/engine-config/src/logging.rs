use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigurationError::invalid("LOG_FORMAT", s, "expected 'text' or 'json'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// An `EnvFilter` directive, e.g. `info` or `engine_core=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

/// Installs the global subscriber. Events go to stderr so that stdout stays
/// free for command output.
pub fn init_tracing(settings: &LogSettings) -> Result<(), ConfigurationError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let env_filter = EnvFilter::try_new(&settings.level)
        .map_err(|e| ConfigurationError::invalid("LOG_LEVEL", &settings.level, e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| ConfigurationError::Logging(e.to_string()))?;
    tracing::debug!(level = %settings.level, format = ?settings.format, "Logging initialised");
    Ok(())
}

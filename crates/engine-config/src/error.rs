use model::execution::errors::TableIdentError;
use thiserror::Error;

/// Errors raised while resolving the runtime configuration. All of them are
/// fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `ETL_ENV` named a profile that does not exist.
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// A variable was set to something that cannot be used.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The destination table name could not be resolved.
    #[error("Invalid destination table: {0}")]
    InvalidTable(#[from] TableIdentError),

    /// The `.env` file could not be read or parsed.
    #[error("Env file error: {0}")]
    EnvFile(String),

    /// The global log subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl ConfigurationError {
    pub fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

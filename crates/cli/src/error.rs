use connectors::warehouse::base::error::WarehouseError;
use engine_config::error::ConfigurationError;
use model::execution::errors::ValidationError;
use server::error::ServerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Building the warehouse client failed.
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to write the result file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Shutdown requested")]
    ShutdownRequested,
}

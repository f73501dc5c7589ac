use thiserror::Error;

/// All errors coming from the warehouse transport.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The warehouse answered with a non-success status.
    #[error("Warehouse returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The job ran but reported errors.
    #[error("Query failed: {0}")]
    Query(String),

    /// A response or cell could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No access token could be obtained.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The job was still running when the client-side deadline passed.
    #[error("Query job {job_id} did not complete within {timeout_secs}s")]
    Timeout { job_id: String, timeout_secs: u64 },

    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

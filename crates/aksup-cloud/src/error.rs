//! Provisioning error types

use thiserror::Error;

/// Errors surfaced while provisioning a resource through a control plane
#[derive(Error, Debug)]
pub enum CloudError {
    /// Credential discovery or validation failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The mutating request was rejected before entering the async flow
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// The long-running operation itself reported failure
    #[error("Operation failed: {0}")]
    Operation(String),

    /// The operation succeeded but the realized resource could not be read
    #[error("Result fetch failed: {0}")]
    ResultFetch(String),

    /// Local polling was aborted; the remote operation keeps running
    #[error("Polling cancelled for operation {0}; the remote operation may still be running")]
    Cancelled(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Short machine-readable category, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            CloudError::Authentication(_) => "auth",
            CloudError::Submission(_) => "submission",
            CloudError::Operation(_) => "operation",
            CloudError::ResultFetch(_) => "result_fetch",
            CloudError::Cancelled(_) => "cancelled",
            CloudError::InvalidConfig(_) => "config",
            CloudError::Io(_) => "io",
            CloudError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

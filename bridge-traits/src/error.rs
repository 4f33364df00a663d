use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand used by adapters that wrap foreign error types.
    pub fn failed(context: &str, err: impl std::fmt::Display) -> Self {
        BridgeError::OperationFailed(format!("{}: {}", context, err))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

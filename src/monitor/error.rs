use thiserror::Error;

/// Errors raised at the chain boundary, classified so callers can tell a
/// flaky node apart from a contract that simply does not answer the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Call reverted: {0}")]
    Reverted(String),

    #[error("Failed to decode return data: {0}")]
    Decode(String),
}

impl ChainError {
    /// Network or node trouble that may clear up on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Rpc(_))
    }
}

/// Result type for chain reads
pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Report channel closed")]
    ChannelError,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl MonitorError {
    /// Errors a worker backs off from instead of dying on
    pub fn is_transient(&self) -> bool {
        match self {
            MonitorError::Chain(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

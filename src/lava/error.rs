use thiserror::Error;

#[derive(Error, Debug)]
pub enum LavaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cached value the parameter can no longer read back. The resolver
    /// downgrades this to a cache miss; it only surfaces from direct calls.
    #[error("Cannot read stored value for '{id}': {reason}")]
    Mismatch { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("{0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, LavaError>;

//! Error types for the ledger core.

use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("incorrect number of arguments: expected {expected}, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid ledger function name: {0}")]
    UnknownFunction(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("history enumeration failed: {0}")]
    Enumeration(String),

    #[error("corruption detected: {0}")]
    Corruption(String),

    #[error("checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("invalid journal format: {0}")]
    InvalidFormat(String),

    #[error("journal is locked by another process")]
    Locked,
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

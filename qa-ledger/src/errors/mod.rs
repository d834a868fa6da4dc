//! Error types for the command flow.

use qa_ledger_core::{AccountError, ErrorKind, LedgerError, LifecycleError};
use thiserror::Error;

/// Errors that stop the command flow itself, as opposed to a single command.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Reading from the command source failed.
    #[error("Read error: {0}")]
    ReadError(String),

    /// Writing a response failed.
    #[error("Write error: {0}")]
    WriteError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl IngestError {
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }
}

/// Errors for a single command. Reported back to the caller, never fatal.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Malformed command: {0}")]
    Malformed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProcessError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::Malformed(_) | ProcessError::Validation(_) => ErrorKind::Invalid,
            ProcessError::Ledger(e) => e.kind(),
            ProcessError::Lifecycle(e) => e.kind(),
            ProcessError::Account(e) => e.kind(),
            ProcessError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

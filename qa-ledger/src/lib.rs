//! # QA Ledger
//!
//! Command front-end for the Q&A voting ledger: reads one JSON command per
//! line, applies it through the scoring and lifecycle core and writes one JSON
//! response per command.
//!
//! ## Architecture
//!
//! 1. **Consumer**: Reads command lines and decodes them
//! 2. **Processor**: Validates a command and runs it against the core services
//! 3. **Orchestrator**: Dispatches commands to bounded concurrent workers and
//!    routes their responses
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Command sources
//! - [`processor`]: Typed commands and their execution
//! - [`orchestrator`]: Coordinates the command flow
//! - [`errors`]: Error types for the binary

pub mod config;
pub mod consumer;
pub mod errors;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, Settings};
pub use errors::{IngestError, ProcessError};

use qa_ledger_repository::LedgerStoreError;
use thiserror::Error;

/// Errors that can occur during startup or while running.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Ledger store error: {0}")]
    StoreError(#[from] LedgerStoreError),

    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

//! Error types for the vote ledger manager.
use qa_ledger_repository::LedgerStoreError;
use qa_ledger_shared::types::{Target, UserId};
use thiserror::Error;

use crate::errors::ErrorKind;

/// Represents errors that can occur while casting or removing votes.
///
/// A failed operation leaves the vote and every balance as they were.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Voter not found: {0}")]
    VoterNotFound(UserId),
    #[error("Target not found: {0}")]
    TargetNotFound(Target),
    #[error("Users cannot vote on their own content")]
    SelfVoteForbidden,
    #[error("Vote on {0} changed concurrently")]
    Conflict(Target),
    #[error("Ledger store error: {0}")]
    Store(#[from] LedgerStoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::VoterNotFound(_) | LedgerError::TargetNotFound(_) => ErrorKind::NotFound,
            LedgerError::SelfVoteForbidden => ErrorKind::Forbidden,
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Store(_) => ErrorKind::Internal,
        }
    }
}

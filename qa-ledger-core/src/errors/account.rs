//! Error types for account and moderation flows.
use qa_ledger_repository::LedgerStoreError;
use qa_ledger_shared::types::UserId;
use thiserror::Error;

use crate::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("User {0} is not a moderator")]
    NotModerator(UserId),
    #[error("A moderator must act on this request")]
    ModeratorRequired,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Duplicate user: {0}")]
    Duplicate(String),
    #[error("Ledger store error: {0}")]
    Store(LedgerStoreError),
}

impl From<LedgerStoreError> for AccountError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::DuplicateUser(name) => AccountError::Duplicate(name),
            LedgerStoreError::UserNotFound(id) => AccountError::UserNotFound(id),
            other => AccountError::Store(other),
        }
    }
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::UserNotFound(_) => ErrorKind::NotFound,
            AccountError::NotModerator(_) | AccountError::ModeratorRequired => ErrorKind::Forbidden,
            AccountError::Validation(_) => ErrorKind::Invalid,
            AccountError::Duplicate(_) => ErrorKind::Conflict,
            AccountError::Store(_) => ErrorKind::Internal,
        }
    }
}

//! Error types for the ledger store.
//! Defines specific errors that can occur during database operations on users,
//! content and votes.
use qa_ledger_shared::types::{QuestionId, UserId};
use thiserror::Error;

/// Represents errors that can occur within the ledger store.
///
/// Besides backend failures, this covers the preconditions a changeset carries:
/// when one of them no longer holds the whole changeset is rolled back.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),

    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    #[error("Vote changed concurrently")]
    VoteConflict,

    #[error("Question {0} changed status concurrently")]
    StaleQuestionStatus(QuestionId),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i16),

    #[error("Invalid question status: {0}")]
    InvalidStatus(String),

    #[error("Vote row has no valid target")]
    InvalidTarget,
}

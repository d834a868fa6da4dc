//! Error types for the content lifecycle controller.
use qa_ledger_repository::LedgerStoreError;
use qa_ledger_shared::types::{AnswerId, QuestionId, UserId};
use thiserror::Error;

use crate::errors::ErrorKind;

/// Represents errors that can occur while creating, accepting or deleting content.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),
    #[error("Author not found: {0}")]
    AuthorNotFound(UserId),
    #[error("Answer not found: {0}")]
    AnswerNotFound(AnswerId),
    #[error("Question {0} is solved and accepts no further answers")]
    QuestionClosed(QuestionId),
    #[error("Answer {answer_id} does not belong to question {question_id}")]
    AnswerNotOfQuestion {
        question_id: QuestionId,
        answer_id: AnswerId,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Question {0} changed concurrently")]
    Conflict(QuestionId),
    #[error("Ledger store error: {0}")]
    Store(#[from] LedgerStoreError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::QuestionNotFound(_)
            | LifecycleError::AuthorNotFound(_)
            | LifecycleError::AnswerNotFound(_) => ErrorKind::NotFound,
            LifecycleError::QuestionClosed(_) | LifecycleError::AnswerNotOfQuestion { .. } => {
                ErrorKind::Forbidden
            }
            LifecycleError::Validation(_) => ErrorKind::Invalid,
            LifecycleError::Conflict(_) => ErrorKind::Conflict,
            LifecycleError::Store(_) => ErrorKind::Internal,
        }
    }
}

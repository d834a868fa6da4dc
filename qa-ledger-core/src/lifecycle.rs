//! Question status machine, answer creation and acceptance.
//!
//! A question moves `Received -> InProgress` when its first answer is recorded
//! and `-> Solved` when an answer is accepted. Solved questions take no further
//! answers. Mutations for one question are serialized in-process; the store's
//! status precondition covers writers in other processes.
use std::sync::Arc;

use chrono::Utc;
use qa_ledger_repository::{LedgerStore, LedgerStoreError};
use qa_ledger_shared::types::{
    Answer, AnswerChangeset, AnswerId, Question, QuestionId, QuestionStatus, RankedAnswer, Target,
    UserId, VotesCount,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::LifecycleError;
use crate::locks::KeyedLocks;

pub struct ContentLifecycleController {
    store: Arc<dyn LedgerStore>,
    locks: KeyedLocks<QuestionId>,
}

/// Trims tags, drops empty ones and removes duplicates keeping first occurrence.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

fn require_text(field: &str, value: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl ContentLifecycleController {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Creates a question in `Received` status.
    #[instrument(skip(self, text, image))]
    pub async fn create_question(
        &self,
        author_id: UserId,
        title: String,
        text: String,
        image: Option<String>,
        tags: Vec<String>,
    ) -> Result<Question, LifecycleError> {
        require_text("title", &title)?;
        require_text("text", &text)?;
        if self.store.find_user(author_id).await?.is_none() {
            return Err(LifecycleError::AuthorNotFound(author_id));
        }

        let question = Question {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            image,
            tags: normalize_tags(tags),
            status: QuestionStatus::Received,
            accepted_answer_id: None,
            created_at: Utc::now(),
        };
        self.store.insert_question(&question).await?;
        info!(question_id = %question.id, "Question created");
        Ok(question)
    }

    /// Records an answer and advances the question out of `Received` when it is
    /// the first one.
    ///
    /// # Returns
    ///
    /// * `Err(LifecycleError::QuestionClosed)` - If the question is already solved
    /// * `Err(LifecycleError::Conflict)` - If another process changed the question status meanwhile
    #[instrument(skip(self, text, image))]
    pub async fn create_answer(
        &self,
        question_id: QuestionId,
        author_id: UserId,
        text: String,
        image: Option<String>,
    ) -> Result<Answer, LifecycleError> {
        require_text("text", &text)?;

        let _guard = self.locks.lock(question_id).await;
        let question = self.question(question_id).await?;
        if self.store.find_user(author_id).await?.is_none() {
            return Err(LifecycleError::AuthorNotFound(author_id));
        }
        if question.status == QuestionStatus::Solved {
            return Err(LifecycleError::QuestionClosed(question_id));
        }

        let existing = self.store.find_answers_of(question_id).await?.len();
        let next_status = (existing == 0 && question.status == QuestionStatus::Received)
            .then_some(QuestionStatus::InProgress);

        let answer = Answer {
            id: Uuid::new_v4(),
            question_id,
            author_id,
            text,
            image,
            created_at: Utc::now(),
        };
        let changeset = AnswerChangeset {
            answer: &answer,
            expected_status: question.status,
            next_status,
        };

        match self.store.persist_answer(&changeset).await {
            Ok(()) => {}
            Err(LedgerStoreError::StaleQuestionStatus(_)) => {
                warn!(%question_id, "Question status changed before the answer was stored");
                return Err(self.stale_status_error(question_id).await);
            }
            Err(LedgerStoreError::QuestionNotFound(id)) => {
                return Err(LifecycleError::QuestionNotFound(id));
            }
            Err(LedgerStoreError::UserNotFound(id)) => {
                return Err(LifecycleError::AuthorNotFound(id));
            }
            Err(err) => return Err(err.into()),
        }

        if let Some(status) = next_status {
            info!(%question_id, status = status.as_str(), "Question status advanced");
        }
        info!(answer_id = %answer.id, %question_id, "Answer created");
        Ok(answer)
    }

    /// Accepts `answer_id` for `question_id` and marks the question solved.
    ///
    /// The answer must exist and belong to the question. Accepting the same
    /// answer again re-persists the same state; accepting a different answer on
    /// a solved question moves the acceptance.
    #[instrument(skip(self))]
    pub async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Question, LifecycleError> {
        let _guard = self.locks.lock(question_id).await;
        self.question(question_id).await?;
        let answer = self
            .store
            .find_answer(answer_id)
            .await?
            .ok_or(LifecycleError::AnswerNotFound(answer_id))?;
        if answer.question_id != question_id {
            return Err(LifecycleError::AnswerNotOfQuestion {
                question_id,
                answer_id,
            });
        }

        let question = self
            .store
            .accept_answer(question_id, answer_id)
            .await?
            .ok_or(LifecycleError::QuestionNotFound(question_id))?;
        info!(%question_id, %answer_id, "Answer accepted");
        Ok(question)
    }

    /// Lists the answers of a question ordered by net votes, highest first.
    ///
    /// Ties keep creation order. Tallies are computed from the votes on every call.
    pub async fn ranked_answers(&self, question_id: QuestionId) -> Result<Vec<RankedAnswer>, LifecycleError> {
        let question = self.question(question_id).await?;
        let answers = self.store.find_answers_of(question_id).await?;

        let mut ranked = Vec::with_capacity(answers.len());
        for answer in answers {
            let votes = self.store.find_votes_for(Target::Answer(answer.id)).await?;
            let count = VotesCount::tally(&votes);
            ranked.push(RankedAnswer {
                accepted: question.accepted_answer_id == Some(answer.id),
                answer,
                upvotes: count.upvotes,
                downvotes: count.downvotes,
            });
        }
        ranked.sort_by(|a, b| b.net_votes().cmp(&a.net_votes()));
        Ok(ranked)
    }

    /// Deletes a question with its answers and votes.
    ///
    /// Scores earned or lost through those votes stay as they are.
    #[instrument(skip(self))]
    pub async fn delete_question(&self, question_id: QuestionId) -> Result<bool, LifecycleError> {
        let _guard = self.locks.lock(question_id).await;
        let deleted = self.store.delete_question(question_id).await?;
        if deleted {
            info!(%question_id, "Question deleted");
        }
        Ok(deleted)
    }

    /// Deletes an answer with its votes. Scores are left untouched.
    #[instrument(skip(self))]
    pub async fn delete_answer(&self, answer_id: AnswerId) -> Result<bool, LifecycleError> {
        let Some(answer) = self.store.find_answer(answer_id).await? else {
            return Ok(false);
        };
        let _guard = self.locks.lock(answer.question_id).await;
        let deleted = self.store.delete_answer(answer_id).await?;
        if deleted {
            info!(%answer_id, question_id = %answer.question_id, "Answer deleted");
        }
        Ok(deleted)
    }

    async fn question(&self, question_id: QuestionId) -> Result<Question, LifecycleError> {
        self.store
            .find_question(question_id)
            .await?
            .ok_or(LifecycleError::QuestionNotFound(question_id))
    }

    async fn stale_status_error(&self, question_id: QuestionId) -> LifecycleError {
        match self.store.find_question(question_id).await {
            Ok(Some(q)) if q.status == QuestionStatus::Solved => LifecycleError::QuestionClosed(question_id),
            Ok(None) => LifecycleError::QuestionNotFound(question_id),
            _ => LifecycleError::Conflict(question_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " rust ".to_string(),
            "".to_string(),
            "async".to_string(),
            "rust".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["rust".to_string(), "async".to_string()]);
    }

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(matches!(require_text("title", "  "), Err(LifecycleError::Validation(_))));
        assert!(require_text("title", "ok").is_ok());
    }
}

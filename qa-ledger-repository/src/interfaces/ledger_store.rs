//! This module defines the `LedgerStore` trait, which provides an interface
//! for the durable storage of users, questions, answers and votes.
//! It abstracts the database operations for persistence and retrieval.
use crate::errors::LedgerStoreError;
use qa_ledger_shared::types::{
    Answer, AnswerChangeset, AnswerId, Question, QuestionId, Target, User, UserId, Vote,
    VoteChangeset, VoteId,
};

/// A trait that defines the interface for interacting with the ledger store.
///
/// Implementors provide keyed lookups for every record type and two atomic
/// write paths: `persist_vote_changeset` for vote mutations with their balance
/// deltas and `persist_answer` for answer creation with its status transition.
/// Balances are only ever changed through additive increments.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Returns
    ///
    /// * `Err(LedgerStoreError::DuplicateUser)` - If the username or email is taken
    async fn insert_user(&self, user: &User) -> Result<(), LedgerStoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerStoreError>;

    /// Returns whether any user currently holds the moderator flag.
    async fn exists_moderator(&self) -> Result<bool, LedgerStoreError>;

    async fn set_moderator(&self, id: UserId, is_moderator: bool) -> Result<Option<User>, LedgerStoreError>;

    async fn set_banned(
        &self,
        id: UserId,
        banned: bool,
        reason: Option<&str>,
    ) -> Result<Option<User>, LedgerStoreError>;

    /// Deletes a user with everything they own: their questions (with the
    /// answers and votes on them), their answers and the votes they cast.
    ///
    /// Balances of other users are left untouched.
    async fn delete_user(&self, id: UserId) -> Result<bool, LedgerStoreError>;

    /// Adds `delta` to the user's score as an atomic increment.
    async fn adjust_score(&self, id: UserId, delta: f64) -> Result<(), LedgerStoreError>;

    /// Adds `delta` to the user's reputation as an atomic increment.
    async fn adjust_reputation(&self, id: UserId, delta: i64) -> Result<(), LedgerStoreError>;

    async fn insert_question(&self, question: &Question) -> Result<(), LedgerStoreError>;

    async fn find_question(&self, id: QuestionId) -> Result<Option<Question>, LedgerStoreError>;

    /// Marks `answer_id` as the accepted answer and moves the question to `Solved`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Question))` - The updated question
    /// * `Ok(None)` - If the question does not exist
    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Option<Question>, LedgerStoreError>;

    /// Deletes a question with its answers and every vote on them.
    ///
    /// Balances are left untouched.
    async fn delete_question(&self, id: QuestionId) -> Result<bool, LedgerStoreError>;

    async fn find_answer(&self, id: AnswerId) -> Result<Option<Answer>, LedgerStoreError>;

    /// Returns the answers of a question in creation order.
    async fn find_answers_of(&self, question_id: QuestionId) -> Result<Vec<Answer>, LedgerStoreError>;

    /// Atomically inserts an answer and applies the question status transition.
    ///
    /// # Returns
    ///
    /// * `Err(LedgerStoreError::QuestionNotFound)` - If the question is gone
    /// * `Err(LedgerStoreError::StaleQuestionStatus)` - If the question status is no
    ///   longer `changeset.expected_status`
    async fn persist_answer(&self, changeset: &AnswerChangeset<'_>) -> Result<(), LedgerStoreError>;

    /// Deletes an answer and every vote on it. Balances are left untouched.
    async fn delete_answer(&self, id: AnswerId) -> Result<bool, LedgerStoreError>;

    async fn find_vote(&self, voter_id: UserId, target: Target) -> Result<Option<Vote>, LedgerStoreError>;

    async fn find_vote_by_id(&self, id: VoteId) -> Result<Option<Vote>, LedgerStoreError>;

    async fn find_votes_for(&self, target: Target) -> Result<Vec<Vote>, LedgerStoreError>;

    /// Returns the votes cast by `voter_id`, oldest first.
    async fn find_votes_by_user(&self, voter_id: UserId) -> Result<Vec<Vote>, LedgerStoreError>;

    /// Atomically persists a vote mutation and its balance deltas.
    ///
    /// Either the vote change and every delta commit, or nothing does.
    ///
    /// # Returns
    ///
    /// * `Err(LedgerStoreError::VoteConflict)` - If the mutation's precondition no longer holds
    /// * `Err(LedgerStoreError::UserNotFound)` - If a delta names a missing user
    async fn persist_vote_changeset(&self, changeset: &VoteChangeset<'_>) -> Result<(), LedgerStoreError>;

    /// Checks that the backing tables exist.
    async fn check_tables_created(&self) -> Result<bool, LedgerStoreError>;
}

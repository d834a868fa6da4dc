//! A store whose question lookups report an author the store has never seen,
//! so every changeset for a question vote fails on its author balance.
use std::sync::Arc;

use async_trait::async_trait;
use qa_ledger_core::{ErrorKind, VoteLedgerManager};
use qa_ledger_repository::{InMemoryLedgerStore, LedgerStore, LedgerStoreError};
use qa_ledger_shared::types::{
    Answer, AnswerChangeset, AnswerId, Polarity, Question, QuestionId, QuestionStatus, Target, User,
    UserId, Vote, VoteChangeset, VoteId,
};
use uuid::Uuid;

struct GhostAuthorStore {
    inner: InMemoryLedgerStore,
    ghost: UserId,
}

#[async_trait]
impl LedgerStore for GhostAuthorStore {
    async fn insert_user(&self, user: &User) -> Result<(), LedgerStoreError> {
        self.inner.insert_user(user).await
    }
    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerStoreError> {
        self.inner.find_user(id).await
    }
    async fn exists_moderator(&self) -> Result<bool, LedgerStoreError> {
        self.inner.exists_moderator().await
    }
    async fn set_moderator(&self, id: UserId, flag: bool) -> Result<Option<User>, LedgerStoreError> {
        self.inner.set_moderator(id, flag).await
    }
    async fn set_banned(
        &self,
        id: UserId,
        banned: bool,
        reason: Option<&str>,
    ) -> Result<Option<User>, LedgerStoreError> {
        self.inner.set_banned(id, banned, reason).await
    }
    async fn delete_user(&self, id: UserId) -> Result<bool, LedgerStoreError> {
        self.inner.delete_user(id).await
    }
    async fn adjust_score(&self, id: UserId, delta: f64) -> Result<(), LedgerStoreError> {
        self.inner.adjust_score(id, delta).await
    }
    async fn adjust_reputation(&self, id: UserId, delta: i64) -> Result<(), LedgerStoreError> {
        self.inner.adjust_reputation(id, delta).await
    }
    async fn insert_question(&self, question: &Question) -> Result<(), LedgerStoreError> {
        self.inner.insert_question(question).await
    }
    async fn find_question(&self, id: QuestionId) -> Result<Option<Question>, LedgerStoreError> {
        Ok(self.inner.find_question(id).await?.map(|mut q| {
            q.author_id = self.ghost;
            q
        }))
    }
    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Option<Question>, LedgerStoreError> {
        self.inner.accept_answer(question_id, answer_id).await
    }
    async fn delete_question(&self, id: QuestionId) -> Result<bool, LedgerStoreError> {
        self.inner.delete_question(id).await
    }
    async fn find_answer(&self, id: AnswerId) -> Result<Option<Answer>, LedgerStoreError> {
        self.inner.find_answer(id).await
    }
    async fn find_answers_of(&self, question_id: QuestionId) -> Result<Vec<Answer>, LedgerStoreError> {
        self.inner.find_answers_of(question_id).await
    }
    async fn persist_answer(&self, changeset: &AnswerChangeset<'_>) -> Result<(), LedgerStoreError> {
        self.inner.persist_answer(changeset).await
    }
    async fn delete_answer(&self, id: AnswerId) -> Result<bool, LedgerStoreError> {
        self.inner.delete_answer(id).await
    }
    async fn find_vote(&self, voter_id: UserId, target: Target) -> Result<Option<Vote>, LedgerStoreError> {
        self.inner.find_vote(voter_id, target).await
    }
    async fn find_vote_by_id(&self, id: VoteId) -> Result<Option<Vote>, LedgerStoreError> {
        self.inner.find_vote_by_id(id).await
    }
    async fn find_votes_for(&self, target: Target) -> Result<Vec<Vote>, LedgerStoreError> {
        self.inner.find_votes_for(target).await
    }
    async fn find_votes_by_user(&self, voter_id: UserId) -> Result<Vec<Vote>, LedgerStoreError> {
        self.inner.find_votes_by_user(voter_id).await
    }
    async fn persist_vote_changeset(&self, changeset: &VoteChangeset<'_>) -> Result<(), LedgerStoreError> {
        self.inner.persist_vote_changeset(changeset).await
    }
    async fn check_tables_created(&self) -> Result<bool, LedgerStoreError> {
        self.inner.check_tables_created().await
    }
}

#[tokio::test]
async fn test_failed_balance_update_leaves_no_vote() {
    let store = Arc::new(GhostAuthorStore {
        inner: InMemoryLedgerStore::new(),
        ghost: Uuid::new_v4(),
    });
    let author = User::new("author", "author@example.com");
    let voter = User::new("voter", "voter@example.com");
    store.insert_user(&author).await.unwrap();
    store.insert_user(&voter).await.unwrap();
    let question = Question {
        id: Uuid::new_v4(),
        author_id: author.id,
        title: "title".to_string(),
        text: "text".to_string(),
        image: None,
        tags: Vec::new(),
        status: QuestionStatus::Received,
        accepted_answer_id: None,
        created_at: chrono::Utc::now(),
    };
    store.insert_question(&question).await.unwrap();

    let ledger = VoteLedgerManager::new(store.clone());
    let target = Target::Question(question.id);
    let err = ledger
        .cast_vote(voter.id, target, Polarity::Downvote)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(store.find_vote(voter.id, target).await.unwrap().is_none());
    assert_eq!(store.find_user(voter.id).await.unwrap().unwrap().score, 0.0);
    assert_eq!(store.find_user(author.id).await.unwrap().unwrap().score, 0.0);
}

//! In-memory implementation of the ledger store.
//!
//! Keeps every record behind a single `RwLock`, so each changeset is applied
//! under one write guard: preconditions are checked first and nothing is
//! written unless all of them hold. Used by tests and by deployments that run
//! without a database.
use std::collections::HashMap;

use async_trait::async_trait;
use qa_ledger_shared::types::{
    Answer, AnswerChangeset, AnswerId, Question, QuestionId, QuestionStatus, Target, User, UserId,
    Vote, VoteChangeset, VoteId, VoteMutation,
};
use tokio::sync::RwLock;

use crate::{LedgerStore, LedgerStoreError};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    questions: HashMap<QuestionId, Question>,
    // creation order matters for answer listings
    answers: Vec<Answer>,
    votes: HashMap<VoteId, Vote>,
}

impl State {
    fn target_exists(&self, target: &Target) -> bool {
        match target {
            Target::Question(id) => self.questions.contains_key(id),
            Target::Answer(id) => self.answers.iter().any(|a| a.id == *id),
        }
    }

    fn vote_on(&self, voter_id: UserId, target: Target) -> Option<&Vote> {
        self.votes
            .values()
            .find(|v| v.voter_id == voter_id && v.target == target)
    }

    fn check_mutation(&self, mutation: &VoteMutation) -> Result<(), LedgerStoreError> {
        match mutation {
            VoteMutation::Insert(vote) => {
                if !self.target_exists(&vote.target) || self.vote_on(vote.voter_id, vote.target).is_some() {
                    return Err(LedgerStoreError::VoteConflict);
                }
            }
            VoteMutation::UpdatePolarity { vote_id, from, .. } => {
                match self.votes.get(vote_id) {
                    Some(vote) if vote.polarity == *from => {}
                    _ => return Err(LedgerStoreError::VoteConflict),
                }
            }
            VoteMutation::Delete { vote_id, polarity } => {
                match self.votes.get(vote_id) {
                    Some(vote) if vote.polarity == *polarity => {}
                    _ => return Err(LedgerStoreError::VoteConflict),
                }
            }
        }
        Ok(())
    }

    fn apply_mutation(&mut self, mutation: &VoteMutation) {
        match mutation {
            VoteMutation::Insert(vote) => {
                self.votes.insert(vote.id, vote.clone());
            }
            VoteMutation::UpdatePolarity { vote_id, to, .. } => {
                if let Some(vote) = self.votes.get_mut(vote_id) {
                    vote.polarity = *to;
                }
            }
            VoteMutation::Delete { vote_id, .. } => {
                self.votes.remove(vote_id);
            }
        }
    }

    fn remove_votes_on(&mut self, target: Target) {
        self.votes.retain(|_, vote| vote.target != target);
    }

    /// Drops the answers matching `doomed` together with the votes on them.
    fn remove_answers(&mut self, doomed: impl Fn(&Answer) -> bool) {
        let answer_ids: Vec<AnswerId> = self.answers.iter().filter(|&a| doomed(a)).map(|a| a.id).collect();
        self.answers.retain(|a| !doomed(a));
        for answer_id in answer_ids {
            self.remove_votes_on(Target::Answer(answer_id));
        }
    }
}

/// In-memory ledger store.
///
/// Offers the same atomicity and precondition guarantees as the PostgreSQL
/// store within a single process.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_user(&self, user: &User) -> Result<(), LedgerStoreError> {
        let mut state = self.state.write().await;
        let taken = state
            .users
            .values()
            .any(|u| u.id == user.id || u.username == user.username || u.email == user.email);
        if taken {
            return Err(LedgerStoreError::DuplicateUser(user.username.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerStoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn exists_moderator(&self) -> Result<bool, LedgerStoreError> {
        Ok(self.state.read().await.users.values().any(|u| u.is_moderator))
    }

    async fn set_moderator(&self, id: UserId, is_moderator: bool) -> Result<Option<User>, LedgerStoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.is_moderator = is_moderator;
            user.clone()
        }))
    }

    async fn set_banned(
        &self,
        id: UserId,
        banned: bool,
        reason: Option<&str>,
    ) -> Result<Option<User>, LedgerStoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.is_banned = banned;
            user.ban_reason = reason.map(str::to_owned);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, LedgerStoreError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        let question_ids: Vec<QuestionId> = state
            .questions
            .values()
            .filter(|q| q.author_id == id)
            .map(|q| q.id)
            .collect();
        for question_id in question_ids {
            state.questions.remove(&question_id);
            state.remove_answers(|a| a.question_id == question_id);
            state.remove_votes_on(Target::Question(question_id));
        }
        state.remove_answers(|a| a.author_id == id);
        state.votes.retain(|_, vote| vote.voter_id != id);
        Ok(true)
    }

    async fn adjust_score(&self, id: UserId, delta: f64) -> Result<(), LedgerStoreError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(LedgerStoreError::UserNotFound(id))?;
        user.score += delta;
        Ok(())
    }

    async fn adjust_reputation(&self, id: UserId, delta: i64) -> Result<(), LedgerStoreError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(LedgerStoreError::UserNotFound(id))?;
        user.reputation += delta;
        Ok(())
    }

    async fn insert_question(&self, question: &Question) -> Result<(), LedgerStoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&question.author_id) {
            return Err(LedgerStoreError::UserNotFound(question.author_id));
        }
        state.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn find_question(&self, id: QuestionId) -> Result<Option<Question>, LedgerStoreError> {
        Ok(self.state.read().await.questions.get(&id).cloned())
    }

    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Option<Question>, LedgerStoreError> {
        let mut state = self.state.write().await;
        Ok(state.questions.get_mut(&question_id).map(|question| {
            question.accepted_answer_id = Some(answer_id);
            question.status = QuestionStatus::Solved;
            question.clone()
        }))
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, LedgerStoreError> {
        let mut state = self.state.write().await;
        if state.questions.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_answers(|a| a.question_id == id);
        state.remove_votes_on(Target::Question(id));
        Ok(true)
    }

    async fn find_answer(&self, id: AnswerId) -> Result<Option<Answer>, LedgerStoreError> {
        Ok(self
            .state
            .read()
            .await
            .answers
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_answers_of(&self, question_id: QuestionId) -> Result<Vec<Answer>, LedgerStoreError> {
        Ok(self
            .state
            .read()
            .await
            .answers
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn persist_answer(&self, changeset: &AnswerChangeset<'_>) -> Result<(), LedgerStoreError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let answer = changeset.answer;
        if !state.users.contains_key(&answer.author_id) {
            return Err(LedgerStoreError::UserNotFound(answer.author_id));
        }
        let question = state
            .questions
            .get_mut(&answer.question_id)
            .ok_or(LedgerStoreError::QuestionNotFound(answer.question_id))?;
        if question.status != changeset.expected_status {
            return Err(LedgerStoreError::StaleQuestionStatus(question.id));
        }
        if let Some(next) = changeset.next_status {
            question.status = next;
        }
        state.answers.push(answer.clone());
        Ok(())
    }

    async fn delete_answer(&self, id: AnswerId) -> Result<bool, LedgerStoreError> {
        let mut state = self.state.write().await;
        let before = state.answers.len();
        state.answers.retain(|a| a.id != id);
        if state.answers.len() == before {
            return Ok(false);
        }
        state.remove_votes_on(Target::Answer(id));
        Ok(true)
    }

    async fn find_vote(&self, voter_id: UserId, target: Target) -> Result<Option<Vote>, LedgerStoreError> {
        Ok(self.state.read().await.vote_on(voter_id, target).cloned())
    }

    async fn find_vote_by_id(&self, id: VoteId) -> Result<Option<Vote>, LedgerStoreError> {
        Ok(self.state.read().await.votes.get(&id).cloned())
    }

    async fn find_votes_for(&self, target: Target) -> Result<Vec<Vote>, LedgerStoreError> {
        Ok(self
            .state
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.target == target)
            .cloned()
            .collect())
    }

    async fn find_votes_by_user(&self, voter_id: UserId) -> Result<Vec<Vote>, LedgerStoreError> {
        let mut votes: Vec<Vote> = self
            .state
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.voter_id == voter_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| v.voted_at);
        Ok(votes)
    }

    async fn persist_vote_changeset(&self, changeset: &VoteChangeset<'_>) -> Result<(), LedgerStoreError> {
        let mut state = self.state.write().await;
        state.check_mutation(changeset.mutation)?;
        if let Some(missing) = changeset
            .balances
            .iter()
            .find(|delta| !state.users.contains_key(&delta.user_id))
        {
            return Err(LedgerStoreError::UserNotFound(missing.user_id));
        }

        state.apply_mutation(changeset.mutation);
        for delta in changeset.balances {
            if let Some(user) = state.users.get_mut(&delta.user_id) {
                user.score += delta.score;
            }
        }
        Ok(())
    }

    async fn check_tables_created(&self) -> Result<bool, LedgerStoreError> {
        Ok(true)
    }
}

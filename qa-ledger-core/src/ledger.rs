//! Vote casting and removal.
//!
//! `VoteLedgerManager` turns a vote request into one of the three transitions
//! (create, toggle-off, flip), computes the score deltas for it and hands the
//! vote change and the deltas to the store as a single changeset. Requests for
//! the same (voter, target) pair are serialized in-process; across processes
//! the changeset preconditions reject writes computed from a stale read.
use std::sync::Arc;

use qa_ledger_repository::{LedgerStore, LedgerStoreError};
use qa_ledger_shared::types::{
    BalanceDelta, Polarity, Target, UserId, Vote, VoteChangeset, VoteId, VoteMutation, VotesCount,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::LedgerError;
use crate::locks::KeyedLocks;
use crate::scoring::{ScoreDeltas, Transition};

pub struct VoteLedgerManager {
    store: Arc<dyn LedgerStore>,
    locks: KeyedLocks<(UserId, Target)>,
}

impl VoteLedgerManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Casts `polarity` from `voter_id` on `target`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Vote))` - The created or flipped vote
    /// * `Ok(None)` - The voter re-submitted their current polarity and the vote was withdrawn
    /// * `Err(LedgerError::SelfVoteForbidden)` - If the voter authored the target
    #[instrument(skip(self))]
    pub async fn cast_vote(
        &self,
        voter_id: UserId,
        target: Target,
        polarity: Polarity,
    ) -> Result<Option<Vote>, LedgerError> {
        if self.store.find_user(voter_id).await?.is_none() {
            return Err(LedgerError::VoterNotFound(voter_id));
        }
        let author_id = self.author_of(target).await?;
        if author_id == voter_id {
            warn!(%voter_id, %target, "Rejected vote on own content");
            return Err(LedgerError::SelfVoteForbidden);
        }

        let _guard = self.locks.lock((voter_id, target)).await;
        let existing = self.store.find_vote(voter_id, target).await?;

        let (mutation, transition, outcome) = match existing {
            None => {
                let vote = Vote::new(voter_id, target, polarity);
                (
                    VoteMutation::Insert(vote.clone()),
                    Transition::Create(polarity),
                    Some(vote),
                )
            }
            Some(vote) if vote.polarity == polarity => (
                VoteMutation::Delete {
                    vote_id: vote.id,
                    polarity,
                },
                Transition::Remove(polarity),
                None,
            ),
            Some(mut vote) => {
                let from = vote.polarity;
                vote.polarity = polarity;
                (
                    VoteMutation::UpdatePolarity {
                        vote_id: vote.id,
                        from,
                        to: polarity,
                    },
                    Transition::Flip { from, to: polarity },
                    Some(vote),
                )
            }
        };

        let deltas = ScoreDeltas::for_transition(target.kind(), transition);
        debug!(?transition, author = deltas.author, voter = deltas.voter, "Computed score deltas");
        self.persist(target, &mutation, author_id, voter_id, deltas).await?;

        info!(?transition, %target, "Vote applied");
        Ok(outcome)
    }

    /// Deletes a vote by id and reverses its score effect.
    ///
    /// Returns `false` if no vote with `vote_id` exists.
    #[instrument(skip(self))]
    pub async fn remove_vote(&self, vote_id: VoteId) -> Result<bool, LedgerError> {
        let Some(vote) = self.store.find_vote_by_id(vote_id).await? else {
            return Ok(false);
        };

        let _guard = self.locks.lock((vote.voter_id, vote.target)).await;
        // The vote may have been toggled off or flipped while we waited.
        let Some(vote) = self.store.find_vote_by_id(vote_id).await? else {
            return Ok(false);
        };
        let author_id = self.author_of(vote.target).await?;

        let transition = Transition::Remove(vote.polarity);
        let deltas = ScoreDeltas::for_transition(vote.target.kind(), transition);
        let mutation = VoteMutation::Delete {
            vote_id: vote.id,
            polarity: vote.polarity,
        };
        self.persist(vote.target, &mutation, author_id, vote.voter_id, deltas)
            .await?;

        info!(%vote_id, target = %vote.target, "Vote removed");
        Ok(true)
    }

    /// Counts the votes currently on `target`.
    ///
    /// Computed from the stored votes on every call; nothing is cached.
    pub async fn votes_count(&self, target: Target) -> Result<VotesCount, LedgerError> {
        self.author_of(target).await?;
        let votes = self.store.find_votes_for(target).await?;
        Ok(VotesCount::tally(&votes))
    }

    pub async fn votes_by_user(&self, voter_id: UserId) -> Result<Vec<Vote>, LedgerError> {
        if self.store.find_user(voter_id).await?.is_none() {
            return Err(LedgerError::VoterNotFound(voter_id));
        }
        Ok(self.store.find_votes_by_user(voter_id).await?)
    }

    async fn author_of(&self, target: Target) -> Result<UserId, LedgerError> {
        let author = match target {
            Target::Question(id) => self.store.find_question(id).await?.map(|q| q.author_id),
            Target::Answer(id) => self.store.find_answer(id).await?.map(|a| a.author_id),
        };
        author.ok_or(LedgerError::TargetNotFound(target))
    }

    async fn persist(
        &self,
        target: Target,
        mutation: &VoteMutation,
        author_id: UserId,
        voter_id: UserId,
        deltas: ScoreDeltas,
    ) -> Result<(), LedgerError> {
        let balances: Vec<BalanceDelta> = [
            BalanceDelta {
                user_id: author_id,
                score: deltas.author,
            },
            BalanceDelta {
                user_id: voter_id,
                score: deltas.voter,
            },
        ]
        .into_iter()
        .filter(|delta| delta.score != 0.0)
        .collect();

        let changeset = VoteChangeset {
            mutation,
            balances: &balances,
        };
        self.store
            .persist_vote_changeset(&changeset)
            .await
            .map_err(|err| match err {
                LedgerStoreError::VoteConflict => {
                    warn!(%target, "Vote changed concurrently, changeset rejected");
                    LedgerError::Conflict(target)
                }
                LedgerStoreError::UserNotFound(id) if id == voter_id => LedgerError::VoterNotFound(id),
                other => LedgerError::Store(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qa_ledger_repository::InMemoryLedgerStore;
    use qa_ledger_shared::types::{Question, QuestionStatus, User};

    async fn setup() -> (VoteLedgerManager, Arc<InMemoryLedgerStore>, User, User, Question) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let author = User::new("author", "author@example.com");
        let voter = User::new("voter", "voter@example.com");
        store.insert_user(&author).await.unwrap();
        store.insert_user(&voter).await.unwrap();
        let question = Question {
            id: uuid::Uuid::new_v4(),
            author_id: author.id,
            title: "title".to_string(),
            text: "text".to_string(),
            image: None,
            tags: Vec::new(),
            status: QuestionStatus::Received,
            accepted_answer_id: None,
            created_at: Utc::now(),
        };
        store.insert_question(&question).await.unwrap();
        let manager = VoteLedgerManager::new(store.clone());
        (manager, store, author, voter, question)
    }

    #[tokio::test]
    async fn test_upvote_skips_zero_voter_delta() {
        let (manager, store, author, voter, question) = setup().await;
        let target = Target::Question(question.id);

        let vote = manager
            .cast_vote(voter.id, target, Polarity::Upvote)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(vote.polarity, Polarity::Upvote);
        assert_eq!(store.find_user(author.id).await.unwrap().unwrap().score, 2.5);
        assert_eq!(store.find_user(voter.id).await.unwrap().unwrap().score, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let (manager, _store, _author, voter, _question) = setup().await;
        let target = Target::Answer(uuid::Uuid::new_v4());

        let result = manager.cast_vote(voter.id, target, Polarity::Upvote).await;
        assert!(matches!(result, Err(LedgerError::TargetNotFound(t)) if t == target));
    }

    #[tokio::test]
    async fn test_remove_unknown_vote_returns_false() {
        let (manager, ..) = setup().await;
        assert!(!manager.remove_vote(uuid::Uuid::new_v4()).await.unwrap());
    }
}

use serde::{Deserialize, Serialize};

use crate::types::{Answer, Polarity, QuestionStatus, UserId, Vote, VoteId};

/// An additive change to a user's score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalanceDelta {
    pub user_id: UserId,
    pub score: f64,
}

/// The single vote row change a changeset carries.
///
/// Every variant states what the row must look like for the change to apply,
/// so a store can reject a mutation computed from a stale read.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteMutation {
    /// Insert a new vote. Fails if the voter already has a vote on the target.
    Insert(Vote),
    /// Flip an existing vote that still has polarity `from`.
    UpdatePolarity {
        vote_id: VoteId,
        from: Polarity,
        to: Polarity,
    },
    /// Delete an existing vote that still has polarity `polarity`.
    Delete { vote_id: VoteId, polarity: Polarity },
}

/// A vote mutation and the balance deltas it causes.
///
/// Persisted as one unit: either the vote change and every delta commit, or
/// nothing does.
pub struct VoteChangeset<'a> {
    pub mutation: &'a VoteMutation,
    pub balances: &'a [BalanceDelta],
}

/// A new answer and the question status transition it triggers.
///
/// `expected_status` is the status the caller based its decision on; the store
/// refuses the changeset if the question has moved on since.
pub struct AnswerChangeset<'a> {
    pub answer: &'a Answer,
    pub expected_status: QuestionStatus,
    pub next_status: Option<QuestionStatus>,
}

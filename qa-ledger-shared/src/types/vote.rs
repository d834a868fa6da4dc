use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Target, UserId, VoteId};

/// The direction of a user's vote.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Positive endorsement of the target.
    Upvote,
    /// Negative endorsement of the target. Costs the voter a penalty.
    Downvote,
}

impl Polarity {
    pub fn is_downvote(self) -> bool {
        matches!(self, Polarity::Downvote)
    }
}

/// A user's current vote on exactly one target.
///
/// At most one `Vote` exists per (voter, target) pair. Re-submitting the same
/// polarity deletes it and submitting the opposite polarity flips it in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: UserId,
    pub target: Target,
    pub polarity: Polarity,
    pub voted_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(voter_id: UserId, target: Target, polarity: Polarity) -> Self {
        Self {
            id: VoteId::new_v4(),
            voter_id,
            target,
            polarity,
            voted_at: Utc::now(),
        }
    }
}

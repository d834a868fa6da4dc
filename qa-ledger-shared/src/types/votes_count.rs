use serde::{Deserialize, Serialize};

use crate::types::{Polarity, Vote};

/// Upvote and downvote tallies for a single target.
///
/// Never stored: always derived by scanning the target's votes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesCount {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        votes
            .into_iter()
            .fold(VotesCount::default(), |mut count, vote| {
                match vote.polarity {
                    Polarity::Upvote => count.upvotes += 1,
                    Polarity::Downvote => count.downvotes += 1,
                }
                count
            })
    }

    pub fn net(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AnswerId, QuestionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub author_id: UserId,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An answer together with its vote tallies, as listed under a question.
///
/// The tallies are computed from the stored votes at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedAnswer {
    pub answer: Answer,
    pub upvotes: i64,
    pub downvotes: i64,
    pub accepted: bool,
}

impl RankedAnswer {
    pub fn net_votes(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

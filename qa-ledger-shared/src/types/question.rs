use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AnswerId, QuestionId, UserId};

/// Lifecycle state of a question.
///
/// `Received -> InProgress` on the first answer, `InProgress -> Solved` when an
/// answer is accepted. No answers are accepted once `Solved`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Received,
    InProgress,
    Solved,
}

impl QuestionStatus {
    /// Storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Received => "received",
            QuestionStatus::InProgress => "in_progress",
            QuestionStatus::Solved => "solved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "received" => Some(QuestionStatus::Received),
            "in_progress" => Some(QuestionStatus::InProgress),
            "solved" => Some(QuestionStatus::Solved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub author_id: UserId,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub status: QuestionStatus,
    pub accepted_answer_id: Option<AnswerId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_storage_names_round_trip() {
        for status in [
            QuestionStatus::Received,
            QuestionStatus::InProgress,
            QuestionStatus::Solved,
        ] {
            assert_eq!(QuestionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QuestionStatus::parse("in progress"), None);
    }
}

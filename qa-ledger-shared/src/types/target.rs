use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AnswerId, QuestionId};

/// The kind of content a vote can be cast on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Question,
    Answer,
}

/// The content a vote applies to: a question or an answer, never both.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    Question(QuestionId),
    Answer(AnswerId),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Question(_) => TargetKind::Question,
            Target::Answer(_) => TargetKind::Answer,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Target::Question(id) | Target::Answer(id) => *id,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Question(id) => write!(f, "question:{id}"),
            Target::Answer(id) => write!(f, "answer:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_serializes_tagged() {
        let id = Uuid::nil();
        let json = serde_json::to_value(Target::Answer(id)).unwrap();
        assert_eq!(json["kind"], "answer");
        assert_eq!(json["id"], id.to_string());

        let parsed: Target = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind(), TargetKind::Answer);
        assert_eq!(parsed.id(), id);
    }
}

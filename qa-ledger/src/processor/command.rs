//! Typed commands accepted on the command stream.

use qa_ledger_shared::types::{AnswerId, Polarity, QuestionId, Target, UserId, VoteId};
use serde::Deserialize;

use crate::errors::ProcessError;

/// One request, decoded from a line such as
/// `{"op": "cast_vote", "voter_id": "...", "target": {"kind": "question", "id": "..."}, "polarity": "upvote"}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreateUser {
        username: String,
        email: String,
    },
    GetUser {
        user_id: UserId,
    },
    SetModerator {
        user_id: UserId,
        is_moderator: bool,
        #[serde(default)]
        actor_id: Option<UserId>,
    },
    BanUser {
        user_id: UserId,
        banned: bool,
        #[serde(default)]
        reason: Option<String>,
        actor_id: UserId,
    },
    DeleteUser {
        user_id: UserId,
        actor_id: UserId,
    },
    CreateQuestion {
        author_id: UserId,
        title: String,
        text: String,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    CreateAnswer {
        question_id: QuestionId,
        author_id: UserId,
        text: String,
        #[serde(default)]
        image: Option<String>,
    },
    AcceptAnswer {
        question_id: QuestionId,
        answer_id: AnswerId,
    },
    RankAnswers {
        question_id: QuestionId,
    },
    DeleteQuestion {
        question_id: QuestionId,
    },
    DeleteAnswer {
        answer_id: AnswerId,
    },
    CastVote {
        voter_id: UserId,
        target: Target,
        polarity: Polarity,
    },
    RemoveVote {
        vote_id: VoteId,
    },
    VotesCount {
        target: Target,
    },
}

/// The record a command reads or writes, used to keep commands on the same
/// record in stream order while unrelated commands run in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderingKey {
    User(UserId),
    Question(QuestionId),
    Answer(AnswerId),
    /// One voter's vote on one target.
    Ballot(UserId, Target),
    Vote(VoteId),
}

fn non_empty(field: &str, value: &str) -> Result<(), ProcessError> {
    if value.trim().is_empty() {
        return Err(ProcessError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl Command {
    /// Name of the operation, as it appears in the `op` field.
    pub fn op(&self) -> &'static str {
        match self {
            Command::CreateUser { .. } => "create_user",
            Command::GetUser { .. } => "get_user",
            Command::SetModerator { .. } => "set_moderator",
            Command::BanUser { .. } => "ban_user",
            Command::DeleteUser { .. } => "delete_user",
            Command::CreateQuestion { .. } => "create_question",
            Command::CreateAnswer { .. } => "create_answer",
            Command::AcceptAnswer { .. } => "accept_answer",
            Command::RankAnswers { .. } => "rank_answers",
            Command::DeleteQuestion { .. } => "delete_question",
            Command::DeleteAnswer { .. } => "delete_answer",
            Command::CastVote { .. } => "cast_vote",
            Command::RemoveVote { .. } => "remove_vote",
            Command::VotesCount { .. } => "votes_count",
        }
    }

    /// Key shared with every other command that must observe this one in
    /// stream order. Creations have no key: nothing can name their record yet.
    pub fn ordering_key(&self) -> Option<OrderingKey> {
        match self {
            Command::CreateUser { .. } | Command::CreateQuestion { .. } | Command::VotesCount { .. } => None,
            Command::GetUser { user_id }
            | Command::SetModerator { user_id, .. }
            | Command::BanUser { user_id, .. }
            | Command::DeleteUser { user_id, .. } => Some(OrderingKey::User(*user_id)),
            Command::CreateAnswer { question_id, .. }
            | Command::AcceptAnswer { question_id, .. }
            | Command::RankAnswers { question_id }
            | Command::DeleteQuestion { question_id } => Some(OrderingKey::Question(*question_id)),
            Command::DeleteAnswer { answer_id } => Some(OrderingKey::Answer(*answer_id)),
            Command::CastVote { voter_id, target, .. } => Some(OrderingKey::Ballot(*voter_id, *target)),
            Command::RemoveVote { vote_id } => Some(OrderingKey::Vote(*vote_id)),
        }
    }

    /// Checks the fields serde cannot: required text must not be blank.
    pub fn validate(&self) -> Result<(), ProcessError> {
        match self {
            Command::CreateUser { username, email } => {
                non_empty("username", username)?;
                non_empty("email", email)
            }
            Command::CreateQuestion { title, text, .. } => {
                non_empty("title", title)?;
                non_empty("text", text)
            }
            Command::CreateAnswer { text, .. } => non_empty("text", text),
            Command::BanUser {
                banned: true,
                reason: Some(reason),
                ..
            } => non_empty("reason", reason),
            _ => Ok(()),
        }
    }
}

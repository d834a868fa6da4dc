//! Row types returned by the PostgreSQL queries and their conversion into
//! domain types.
use chrono::{DateTime, Utc};
use qa_ledger_shared::types::{Answer, Polarity, Question, QuestionStatus, Target, User, Vote};
use uuid::Uuid;

use crate::LedgerStoreError;

pub(crate) fn vote_type(polarity: Polarity) -> i16 {
    match polarity {
        Polarity::Upvote => 0,
        Polarity::Downvote => 1,
    }
}

pub(crate) fn polarity(vote_type: i16) -> Result<Polarity, LedgerStoreError> {
    match vote_type {
        0 => Ok(Polarity::Upvote),
        1 => Ok(Polarity::Downvote),
        other => Err(LedgerStoreError::InvalidVoteType(other)),
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    score: f64,
    reputation: i64,
    is_moderator: bool,
    is_banned: bool,
    ban_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            score: row.score,
            reputation: row.reputation,
            is_moderator: row.is_moderator,
            is_banned: row.is_banned,
            ban_reason: row.ban_reason,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct QuestionRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    text: String,
    image: Option<String>,
    tags: Vec<String>,
    status: String,
    accepted_answer_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = LedgerStoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let status = QuestionStatus::parse(&row.status)
            .ok_or_else(|| LedgerStoreError::InvalidStatus(row.status.clone()))?;
        Ok(Question {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            text: row.text,
            image: row.image,
            tags: row.tags,
            status,
            accepted_answer_id: row.accepted_answer_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AnswerRow {
    id: Uuid,
    question_id: Uuid,
    author_id: Uuid,
    text: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AnswerRow> for Answer {
    fn from(row: AnswerRow) -> Self {
        Answer {
            id: row.id,
            question_id: row.question_id,
            author_id: row.author_id,
            text: row.text,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct VoteRow {
    id: Uuid,
    voter_id: Uuid,
    question_id: Option<Uuid>,
    answer_id: Option<Uuid>,
    vote_type: i16,
    voted_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = LedgerStoreError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let target = match (row.question_id, row.answer_id) {
            (Some(question_id), None) => Target::Question(question_id),
            (None, Some(answer_id)) => Target::Answer(answer_id),
            _ => return Err(LedgerStoreError::InvalidTarget),
        };
        Ok(Vote {
            id: row.id,
            voter_id: row.voter_id,
            target,
            polarity: polarity(row.vote_type)?,
            voted_at: row.voted_at,
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A platform account with its balance.
///
/// `score` and `reputation` start at zero and only ever move through additive
/// increments issued by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub score: f64,
    pub reputation: i64,
    pub is_moderator: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new_v4(),
            username: username.into(),
            email: email.into(),
            score: 0.0,
            reputation: 0,
            is_moderator: false,
            is_banned: false,
            ban_reason: None,
            created_at: Utc::now(),
        }
    }
}

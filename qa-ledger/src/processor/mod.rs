//! Command processing.
//!
//! Validates a decoded command and runs it against the core services,
//! producing the JSON payload of a successful response.

mod command;

pub use command::{Command, OrderingKey};

use std::sync::Arc;

use qa_ledger_core::{AccountService, ContentLifecycleController, VoteLedgerManager};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::errors::ProcessError;

pub struct CommandProcessor {
    ledger: Arc<VoteLedgerManager>,
    lifecycle: Arc<ContentLifecycleController>,
    accounts: Arc<AccountService>,
}

impl CommandProcessor {
    pub fn new(
        ledger: Arc<VoteLedgerManager>,
        lifecycle: Arc<ContentLifecycleController>,
        accounts: Arc<AccountService>,
    ) -> Self {
        Self {
            ledger,
            lifecycle,
            accounts,
        }
    }

    /// Validates and executes `command`.
    #[instrument(skip(self, command), fields(op = command.op()))]
    pub async fn process(&self, command: Command) -> Result<Value, ProcessError> {
        command.validate()?;
        debug!("Executing command");

        let value = match command {
            Command::CreateUser { username, email } => {
                serde_json::to_value(self.accounts.create_user(&username, &email).await?)?
            }
            Command::GetUser { user_id } => serde_json::to_value(self.accounts.get_user(user_id).await?)?,
            Command::SetModerator {
                user_id,
                is_moderator,
                actor_id,
            } => serde_json::to_value(
                self.accounts
                    .set_moderator(user_id, is_moderator, actor_id)
                    .await?,
            )?,
            Command::BanUser {
                user_id,
                banned,
                reason,
                actor_id,
            } => serde_json::to_value(
                self.accounts
                    .ban_user(user_id, banned, reason, actor_id)
                    .await?,
            )?,
            Command::DeleteUser { user_id, actor_id } => {
                json!({ "deleted": self.accounts.delete_user(user_id, actor_id).await? })
            }
            Command::CreateQuestion {
                author_id,
                title,
                text,
                image,
                tags,
            } => serde_json::to_value(
                self.lifecycle
                    .create_question(author_id, title, text, image, tags)
                    .await?,
            )?,
            Command::CreateAnswer {
                question_id,
                author_id,
                text,
                image,
            } => serde_json::to_value(
                self.lifecycle
                    .create_answer(question_id, author_id, text, image)
                    .await?,
            )?,
            Command::AcceptAnswer {
                question_id,
                answer_id,
            } => serde_json::to_value(self.lifecycle.accept_answer(question_id, answer_id).await?)?,
            Command::RankAnswers { question_id } => {
                serde_json::to_value(self.lifecycle.ranked_answers(question_id).await?)?
            }
            Command::DeleteQuestion { question_id } => {
                json!({ "deleted": self.lifecycle.delete_question(question_id).await? })
            }
            Command::DeleteAnswer { answer_id } => {
                json!({ "deleted": self.lifecycle.delete_answer(answer_id).await? })
            }
            Command::CastVote {
                voter_id,
                target,
                polarity,
            } => json!({ "vote": self.ledger.cast_vote(voter_id, target, polarity).await? }),
            Command::RemoveVote { vote_id } => {
                json!({ "removed": self.ledger.remove_vote(vote_id).await? })
            }
            Command::VotesCount { target } => {
                let count = self.ledger.votes_count(target).await?;
                json!({ "upvotes": count.upvotes, "downvotes": count.downvotes, "net": count.net() })
            }
        };
        Ok(value)
    }
}

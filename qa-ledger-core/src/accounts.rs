//! Account creation, balances outside the voting path and moderation.
use std::sync::Arc;

use qa_ledger_repository::LedgerStore;
use qa_ledger_shared::types::{User, UserId};
use tracing::{info, instrument, warn};

use crate::errors::AccountError;
use crate::notifier::Notifier;

pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Creates an account with zero score and reputation.
    #[instrument(skip(self, email))]
    pub async fn create_user(&self, username: &str, email: &str) -> Result<User, AccountError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(AccountError::Validation("username must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(AccountError::Validation(format!("invalid email: {email}")));
        }

        let user = User::new(username, email);
        self.store.insert_user(&user).await?;
        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AccountError> {
        self.store
            .find_user(id)
            .await?
            .ok_or(AccountError::UserNotFound(id))
    }

    /// Whether any user currently holds the moderator flag.
    pub async fn exists_moderator(&self) -> Result<bool, AccountError> {
        Ok(self.store.exists_moderator().await?)
    }

    /// Grants or revokes the moderator flag on `target`.
    ///
    /// While at least one moderator exists, `actor` must be one of them. With no
    /// moderators at all the first promotion is self-service.
    #[instrument(skip(self))]
    pub async fn set_moderator(
        &self,
        target: UserId,
        is_moderator: bool,
        actor: Option<UserId>,
    ) -> Result<User, AccountError> {
        if self.store.exists_moderator().await? {
            self.require_moderator(actor.ok_or(AccountError::ModeratorRequired)?)
                .await?;
        }

        let user = self
            .store
            .set_moderator(target, is_moderator)
            .await?
            .ok_or(AccountError::UserNotFound(target))?;
        info!(user_id = %target, is_moderator, "Moderator flag updated");
        Ok(user)
    }

    /// Bans or unbans `target` on behalf of the moderator `actor`.
    ///
    /// Moderators are never banned; the request returns them unchanged. A ban on
    /// a user who was not banned before sends a ban notification.
    #[instrument(skip(self, reason))]
    pub async fn ban_user(
        &self,
        target: UserId,
        banned: bool,
        reason: Option<String>,
        actor: UserId,
    ) -> Result<User, AccountError> {
        self.require_moderator(actor).await?;
        let user = self.get_user(target).await?;
        if user.is_moderator {
            warn!(user_id = %target, "Ignoring ban request for a moderator");
            return Ok(user);
        }

        let was_banned = user.is_banned;
        let reason = if banned { Some(reason.unwrap_or_default()) } else { None };
        let user = self
            .store
            .set_banned(target, banned, reason.as_deref())
            .await?
            .ok_or(AccountError::UserNotFound(target))?;

        if banned && !was_banned {
            self.notifier
                .send_ban_notification(&user, reason.as_deref().unwrap_or_default())
                .await;
        }
        info!(user_id = %target, banned, "Ban state updated");
        Ok(user)
    }

    /// Deletes `target` on behalf of the moderator `actor`, together with the
    /// questions, answers and votes `target` owns.
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - If `target` does not exist
    /// * `Err(AccountError::NotModerator)` - If `actor` is not a moderator
    #[instrument(skip(self))]
    pub async fn delete_user(&self, target: UserId, actor: UserId) -> Result<bool, AccountError> {
        self.require_moderator(actor).await?;
        let deleted = self.store.delete_user(target).await?;
        if deleted {
            info!(user_id = %target, moderator_id = %actor, "User deleted");
        }
        Ok(deleted)
    }

    /// Adds `delta` to the user's reputation.
    #[instrument(skip(self))]
    pub async fn adjust_reputation(&self, id: UserId, delta: i64) -> Result<User, AccountError> {
        self.store.adjust_reputation(id, delta).await?;
        self.get_user(id).await
    }

    async fn require_moderator(&self, actor: UserId) -> Result<(), AccountError> {
        match self.store.find_user(actor).await? {
            Some(user) if user.is_moderator => Ok(()),
            _ => Err(AccountError::NotModerator(actor)),
        }
    }
}

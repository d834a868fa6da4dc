use std::sync::{Arc, Mutex};

use qa_ledger_core::{AccountError, AccountService, ErrorKind, Notifier};
use qa_ledger_repository::InMemoryLedgerStore;
use qa_ledger_shared::types::User;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_ban_notification(&self, user: &User, reason: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((user.username.clone(), reason.to_string()));
    }
}

fn service() -> (AccountService, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = AccountService::new(Arc::new(InMemoryLedgerStore::new()), notifier.clone());
    (service, notifier)
}

#[tokio::test]
async fn test_create_user_starts_with_zero_balances() {
    let (accounts, _) = service();
    let user = accounts.create_user("alice", "alice@example.com").await.unwrap();

    let stored = accounts.get_user(user.id).await.unwrap();
    assert_eq!(stored.score, 0.0);
    assert_eq!(stored.reputation, 0);
    assert!(!stored.is_moderator);
    assert!(!stored.is_banned);

    let dup = accounts.create_user("alice", "other@example.com").await.unwrap_err();
    assert!(matches!(dup, AccountError::Duplicate(_)));

    let invalid = accounts.create_user("bob", "not-an-email").await.unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::Invalid);
}

#[tokio::test]
async fn test_first_moderator_is_self_service_then_gated() {
    let (accounts, _) = service();
    let alice = accounts.create_user("alice", "alice@example.com").await.unwrap();
    let bob = accounts.create_user("bob", "bob@example.com").await.unwrap();
    let carol = accounts.create_user("carol", "carol@example.com").await.unwrap();

    assert!(!accounts.exists_moderator().await.unwrap());
    let promoted = accounts.set_moderator(alice.id, true, None).await.unwrap();
    assert!(promoted.is_moderator);
    assert!(accounts.exists_moderator().await.unwrap());

    let err = accounts.set_moderator(carol.id, true, Some(bob.id)).await.unwrap_err();
    assert!(matches!(err, AccountError::NotModerator(id) if id == bob.id));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = accounts.set_moderator(carol.id, true, None).await.unwrap_err();
    assert!(matches!(err, AccountError::ModeratorRequired));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(!accounts.get_user(carol.id).await.unwrap().is_moderator);

    let promoted = accounts.set_moderator(bob.id, true, Some(alice.id)).await.unwrap();
    assert!(promoted.is_moderator);
}

#[tokio::test]
async fn test_ban_notifies_once_and_spares_moderators() {
    let (accounts, notifier) = service();
    let moderator = accounts.create_user("mod", "mod@example.com").await.unwrap();
    let user = accounts.create_user("troll", "troll@example.com").await.unwrap();
    accounts.set_moderator(moderator.id, true, None).await.unwrap();

    let banned = accounts
        .ban_user(user.id, true, Some("spam".to_string()), moderator.id)
        .await
        .unwrap();
    assert!(banned.is_banned);
    assert_eq!(banned.ban_reason.as_deref(), Some("spam"));

    accounts
        .ban_user(user.id, true, Some("still spam".to_string()), moderator.id)
        .await
        .unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);

    let unbanned = accounts.ban_user(user.id, false, None, moderator.id).await.unwrap();
    assert!(!unbanned.is_banned);
    assert!(unbanned.ban_reason.is_none());

    let spared = accounts.ban_user(moderator.id, true, None, moderator.id).await.unwrap();
    assert!(!spared.is_banned);

    let err = accounts.ban_user(moderator.id, true, None, user.id).await.unwrap_err();
    assert!(matches!(err, AccountError::NotModerator(_)));
}

#[tokio::test]
async fn test_delete_user_requires_moderator() {
    let (accounts, _) = service();
    let moderator = accounts.create_user("mod", "mod@example.com").await.unwrap();
    let user = accounts.create_user("spammer", "spammer@example.com").await.unwrap();
    accounts.set_moderator(moderator.id, true, None).await.unwrap();

    let err = accounts.delete_user(moderator.id, user.id).await.unwrap_err();
    assert!(matches!(err, AccountError::NotModerator(id) if id == user.id));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    assert!(accounts.delete_user(user.id, moderator.id).await.unwrap());
    assert!(!accounts.delete_user(user.id, moderator.id).await.unwrap());
    let missing = accounts.get_user(user.id).await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_adjust_reputation() {
    let (accounts, _) = service();
    let user = accounts.create_user("alice", "alice@example.com").await.unwrap();

    accounts.adjust_reputation(user.id, 10).await.unwrap();
    let updated = accounts.adjust_reputation(user.id, -3).await.unwrap();
    assert_eq!(updated.reputation, 7);
    assert_eq!(updated.score, 0.0);

    let missing = accounts.adjust_reputation(uuid::Uuid::new_v4(), 1).await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

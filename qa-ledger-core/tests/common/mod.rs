#![allow(dead_code)]

use std::sync::Arc;

use qa_ledger_core::{AccountService, ContentLifecycleController, TracingNotifier, VoteLedgerManager};
use qa_ledger_repository::{InMemoryLedgerStore, LedgerStore};
use qa_ledger_shared::types::{Answer, Question, User, UserId};

pub struct Fixture {
    pub store: Arc<InMemoryLedgerStore>,
    pub ledger: VoteLedgerManager,
    pub lifecycle: ContentLifecycleController,
    pub accounts: AccountService,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(InMemoryLedgerStore::new());
    Fixture {
        ledger: VoteLedgerManager::new(store.clone()),
        lifecycle: ContentLifecycleController::new(store.clone()),
        accounts: AccountService::new(store.clone(), Arc::new(TracingNotifier)),
        store,
    }
}

impl Fixture {
    pub async fn user(&self, name: &str) -> User {
        self.accounts
            .create_user(name, &format!("{name}@example.com"))
            .await
            .unwrap()
    }

    pub async fn question(&self, author: &User) -> Question {
        self.lifecycle
            .create_question(
                author.id,
                "How do I share state between tasks?".to_string(),
                "I need a counter updated from many tasks".to_string(),
                None,
                vec!["rust".to_string(), "tokio".to_string()],
            )
            .await
            .unwrap()
    }

    pub async fn answer(&self, question: &Question, author: &User) -> Answer {
        self.lifecycle
            .create_answer(question.id, author.id, "Wrap it in an Arc<Mutex<_>>".to_string(), None)
            .await
            .unwrap()
    }

    pub async fn score(&self, id: UserId) -> f64 {
        self.store.find_user(id).await.unwrap().unwrap().score
    }
}

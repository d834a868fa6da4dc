//! # QA Ledger Core
//! This crate holds the voting, scoring and content-lifecycle rules of the
//! Q&A platform.
//!
//! ## Modules
//!
//! - [`scoring`]: Pure score deltas for vote transitions
//! - [`ledger`]: Vote casting and removal with balance updates
//! - [`lifecycle`]: Question status machine and answer creation
//! - [`accounts`]: Account creation and moderator-gated flows
//! - [`notifier`]: Notification collaborator used by moderation
//! - [`locks`]: Per-key serialization of read-modify-write sequences
//! - [`errors`]: Error types for every service
pub mod accounts;
pub mod errors;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod notifier;
pub mod scoring;

pub use accounts::AccountService;
pub use errors::{AccountError, ErrorKind, LedgerError, LifecycleError};
pub use ledger::VoteLedgerManager;
pub use lifecycle::ContentLifecycleController;
pub use notifier::{Notifier, TracingNotifier};

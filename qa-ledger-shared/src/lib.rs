//! # QA Ledger Shared
//! This crate defines the data structures shared across the ledger crates.
//! It includes users, questions, answers, votes and the changesets the
//! ledger store persists atomically.
pub mod types;

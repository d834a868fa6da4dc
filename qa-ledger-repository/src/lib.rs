//! # QA Ledger Repository
//! This crate provides the ledger store contract used by the voting and
//! lifecycle services. It includes definitions for errors, the interface,
//! and concrete implementations for PostgreSQL and for in-process memory.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::LedgerStoreError;
pub use interfaces::LedgerStore;
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

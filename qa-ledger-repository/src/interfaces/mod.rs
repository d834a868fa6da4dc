//! This module defines and re-exports the interfaces for the ledger store.
mod ledger_store;

pub use ledger_store::LedgerStore;

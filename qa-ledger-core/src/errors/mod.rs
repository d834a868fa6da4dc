mod account;
mod ledger;
mod lifecycle;

pub use account::AccountError;
pub use ledger::LedgerError;
pub use lifecycle::LifecycleError;

use serde::Serialize;

/// Coarse classification shared by every core error.
///
/// Callers map failures to rejected requests through this instead of matching
/// each service's enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Invalid,
    Internal,
}

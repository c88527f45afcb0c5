pub mod ledger;
pub mod models;
pub mod time;

pub use ledger::{INITIAL_RATING, LegacyHint, Ledger, LedgerEntry, Outcome};
pub use models::*;

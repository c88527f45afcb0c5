pub mod reconciliation;
pub mod replay;
pub mod reports;
pub mod server;
pub mod submission;

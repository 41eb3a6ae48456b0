// Service exports
pub mod notifier;
pub mod retry;
pub mod scoring;
pub mod store;

pub use notifier::{DispatchError, MailGateway};
pub use retry::RetryPolicy;
pub use scoring::{ScoringClient, ScoringError};
pub use store::{NewDecision, PersistenceError, PostgresStore};

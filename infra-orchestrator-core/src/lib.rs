//! Infra Orchestrator Core Library
//!
//! Aggregation and reconciliation logic on top of the remote service clients:
//! - [`ReconciliationStore`]: the single local mirror of remote state
//! - Stats enrichment (`StatsService`)
//! - Commit feed aggregation (`CommitFeedService`)
//! - Zone aggregation across DNS accounts (`ZoneService`)
//! - Bulk record rewrite (`BulkRewriteService`)
//! - Single-entity repository, record and account operations
//!
//! The library performs no storage or UI work of its own; the platform layer
//! injects the remote services and the shared store through [`ServiceContext`].

pub mod error;
pub mod services;
pub mod settings;
pub mod store;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use settings::CoreSettings;
pub use store::{ReconciliationStore, SharedStore};

//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a single use case.

pub mod migration;
mod query;
mod status;
mod sync;

pub use migration::{MigrationResult, MigrationService};
pub use query::{cache_key, QueryService, INVALID_SKIP_MESSAGE, INVALID_TAKE_MESSAGE};
pub use status::{StatusService, StatusSummary};
pub use sync::{SyncResult, SyncService, PARSE_FAILURE_MESSAGE};

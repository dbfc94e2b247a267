//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits and receive implementations through their
//! constructors.

mod cache;
mod feed;
mod store;

pub use cache::PageCache;
pub use feed::{FeedPage, FeedRecord, TransactionFeed};
pub use store::TransactionStore;

//! Response cache port

use crate::domain::{PagedResult, TransactionDto};

/// Memoization of transaction pages keyed by query parameters
pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<PagedResult<TransactionDto>>;

    fn insert(&self, key: &str, page: PagedResult<TransactionDto>);
}

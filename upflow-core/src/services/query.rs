//! Query service - paginated, cached reads of stored transactions

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{PagedResult, TransactionDto};
use crate::ports::{PageCache, TransactionStore};

pub const INVALID_SKIP_MESSAGE: &str = "The skip parameter must be at greater than or equal to 0.";
pub const INVALID_TAKE_MESSAGE: &str = "The take parameter must be at greater than 0.";

/// Cache key for one page of transactions
pub fn cache_key(skip: i64, take: i64) -> String {
    format!("transactions_{}_{}", skip, take)
}

/// Query service for transaction pages
pub struct QueryService {
    store: Arc<dyn TransactionStore>,
    cache: Arc<dyn PageCache>,
}

impl QueryService {
    pub fn new(store: Arc<dyn TransactionStore>, cache: Arc<dyn PageCache>) -> Self {
        Self { store, cache }
    }

    /// One page of transactions ordered by internal id
    ///
    /// Invalid paging parameters come back as a failed page without
    /// touching the store or the cache. A page, once cached, is served
    /// from the cache for as long as the cache keeps it.
    pub fn list_page(&self, skip: i64, take: i64) -> Result<PagedResult<TransactionDto>> {
        if skip < 0 {
            tracing::warn!(skip, "{}", INVALID_SKIP_MESSAGE);
            return Ok(PagedResult::fail(INVALID_SKIP_MESSAGE));
        }

        if take <= 0 {
            tracing::warn!(take, "{}", INVALID_TAKE_MESSAGE);
            return Ok(PagedResult::fail(INVALID_TAKE_MESSAGE));
        }

        tracing::trace!(skip, take, "Retrieving transaction page");

        let key = cache_key(skip, take);
        if let Some(page) = self.cache.get(&key) {
            tracing::debug!(skip, take, "Retrieved transactions page from cache");
            return Ok(page);
        }

        let rows = self
            .store
            .page(skip, take)?
            .iter()
            .map(TransactionDto::from)
            .collect();
        let page = PagedResult::ok(rows, self.store.count()?);

        self.cache.insert(&key, page.clone());
        tracing::debug!(skip, take, "Retrieved transactions page from database");

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::adapters::memory_cache::MemoryPageCache;
    use crate::domain::NewTransaction;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn setup(n: i64) -> (Arc<DuckDbRepository>, Arc<MemoryPageCache>, QueryService) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let records: Vec<_> = (0..n)
            .map(|i| {
                NewTransaction::new(
                    format!("tx{}", i),
                    Decimal::new(i * 100, 2),
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(i),
                )
            })
            .collect();
        repo.insert_batch(&records).unwrap();

        let cache = Arc::new(MemoryPageCache::new());
        let service = QueryService::new(repo.clone(), cache.clone());
        (repo, cache, service)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(0, 20), "transactions_0_20");
        assert_eq!(cache_key(40, 10), "transactions_40_10");
    }

    #[test]
    fn test_negative_skip_is_rejected() {
        let (_, cache, service) = setup(3);
        let page = service.list_page(-1, 20).unwrap();

        assert!(page.error);
        assert_eq!(page.error_message.as_deref(), Some(INVALID_SKIP_MESSAGE));
        assert!(page.rows.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_non_positive_take_is_rejected() {
        let (_, cache, service) = setup(3);

        for take in [0, -5] {
            let page = service.list_page(0, take).unwrap();
            assert!(page.error);
            assert_eq!(page.error_message.as_deref(), Some(INVALID_TAKE_MESSAGE));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_first_page() {
        let (_, _, service) = setup(5);
        let page = service.list_page(0, 2).unwrap();

        assert!(!page.error);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.rows.len(), 2);
        assert!(page.rows[0].id < page.rows[1].id);
        assert_eq!(page.rows[1].value, Decimal::new(100, 2));
    }

    #[test]
    fn test_skip_past_end() {
        let (_, _, service) = setup(2);
        let page = service.list_page(10, 20).unwrap();

        assert!(!page.error);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_cached_page_is_served_after_new_rows() {
        let (repo, cache, service) = setup(2);
        let first = service.list_page(0, 20).unwrap();
        assert_eq!(cache.len(), 1);

        repo.insert_batch(&[NewTransaction::new(
            "late",
            Decimal::ONE,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )])
        .unwrap();

        let second = service.list_page(0, 20).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.total_count, 2);

        // A different key reads fresh data
        let other = service.list_page(0, 10).unwrap();
        assert_eq!(other.total_count, 3);
    }
}

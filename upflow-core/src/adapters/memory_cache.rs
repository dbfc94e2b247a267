//! In-memory page cache
//!
//! Without a TTL an entry lives for the whole process, even after new
//! transactions are synchronized. Pages served from here can therefore be
//! stale; a TTL bounds how stale.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::{PagedResult, TransactionDto};
use crate::ports::PageCache;

struct CacheEntry {
    page: PagedResult<TransactionDto>,
    inserted_at: Instant,
}

/// Page cache backed by a mutex-guarded map
#[derive(Default)]
pub struct MemoryPageCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl MemoryPageCache {
    /// Cache whose entries never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose entries expire `ttl` after insertion
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Number of entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, key: &str) -> Option<PagedResult<TransactionDto>> {
        let mut entries = self.entries();
        let expired = match (entries.get(key), self.ttl) {
            (None, _) => return None,
            (Some(entry), Some(ttl)) => entry.inserted_at.elapsed() >= ttl,
            (Some(_), None) => false,
        };

        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.page.clone())
    }

    fn insert(&self, key: &str, page: PagedResult<TransactionDto>) {
        self.entries().insert(
            key.to_string(),
            CacheEntry {
                page,
                inserted_at: Instant::now(),
            },
        );
    }
}

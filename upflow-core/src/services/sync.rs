//! Sync service - incremental ingestion of settled transactions
//!
//! Walks the remote feed newest-first, page by page, and stages every
//! record that is newer than the local high-water mark and not yet stored.
//! Staged records are committed in one batch once the walk ends.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Empty, NewTransaction, PagedResult};
use crate::ports::{TransactionFeed, TransactionStore};

/// User-facing message for a feed body that could not be decoded
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse Up Bank transactions.";

/// Outcome of one synchronization
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncResult {
    /// Transactions committed by this call
    pub new_count: i64,
    /// Records passed over because their id is already known
    pub skipped: i64,
    /// Feed pages fetched
    pub pages: usize,
    /// Whether the walk ended on the high-water mark rather than the end of the feed
    pub stopped_early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    /// A failed walk; nothing was committed
    fn failed(error: &Error) -> Self {
        let message = match error {
            Error::Transport(msg) => msg.clone(),
            _ => PARSE_FAILURE_MESSAGE.to_string(),
        };
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<SyncResult> for PagedResult<Empty> {
    fn from(result: SyncResult) -> Self {
        match result.error {
            Some(message) => PagedResult::fail(message),
            None => PagedResult::ok(Vec::new(), result.new_count),
        }
    }
}

/// Sync service for pulling new transactions from the feed
pub struct SyncService {
    store: Arc<dyn TransactionStore>,
    feed: Arc<dyn TransactionFeed>,
    /// Held for a whole walk so two syncs never stage the same records
    sync_lock: Mutex<()>,
}

impl SyncService {
    pub fn new(store: Arc<dyn TransactionStore>, feed: Arc<dyn TransactionFeed>) -> Self {
        Self {
            store,
            feed,
            sync_lock: Mutex::new(()),
        }
    }

    /// Pull every transaction settled after the newest stored one
    ///
    /// Transport and parse failures abort the walk, discard everything
    /// staged so far and come back as `Ok` with `error` set. Store failures
    /// are returned as `Err`.
    pub fn synchronize(&self) -> Result<SyncResult> {
        // The lock guards no data, so a walk that panicked leaves nothing to repair
        let _guard = self
            .sync_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        tracing::trace!("Pulling new transactions from Up Bank");

        let high_water_mark = self.store.max_settled_at()?;
        let mut cursor = Some(self.feed.first_page_url());
        let mut staged: Vec<NewTransaction> = Vec::new();
        let mut staged_ids: HashSet<String> = HashSet::new();
        let mut result = SyncResult::default();

        'walk: while let Some(url) = cursor.take() {
            tracing::trace!(%url, "Retrieving transactions");

            let page = match self.feed.fetch_page(&url) {
                Ok(page) => page,
                Err(e) if e.is_feed_error() => {
                    tracing::error!(%url, error = %e, "Failed to retrieve transactions from Up Bank");
                    return Ok(SyncResult::failed(&e));
                }
                Err(e) => return Err(e),
            };
            result.pages += 1;

            for record in page.records {
                tracing::trace!(id = %record.id, "Parsing transaction");

                // Stop is checked before the exists lookup is issued
                if high_water_mark.is_some_and(|mark| record.settled_at <= mark) {
                    tracing::info!(
                        id = %record.id,
                        settled_at = %record.settled_at,
                        "Stopping at transaction settled at or before the latest stored one"
                    );
                    result.stopped_early = true;
                    break 'walk;
                }

                if staged_ids.contains(&record.id) || self.store.exists_by_external_id(&record.id)? {
                    tracing::info!(id = %record.id, "Skipping transaction because it already exists");
                    result.skipped += 1;
                    continue;
                }

                staged_ids.insert(record.id.clone());
                staged.push(record.into());
            }

            cursor = page.next.filter(|next| !next.is_empty());
        }

        tracing::debug!(staged = staged.len(), "Saving new transactions");
        let inserted = self.store.insert_batch(&staged)?;
        if inserted != staged.len() {
            tracing::warn!(
                staged = staged.len(),
                inserted,
                "Some staged transactions were already stored by another writer"
            );
        }

        result.new_count = inserted as i64;
        tracing::info!(
            new = result.new_count,
            skipped = result.skipped,
            pages = result.pages,
            "Synchronized transactions"
        );
        Ok(result)
    }
}

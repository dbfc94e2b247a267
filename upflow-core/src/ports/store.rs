//! Transaction store port - durable table of settled transactions

use chrono::{DateTime, Utc};

use crate::domain::result::Result;
use crate::domain::{NewTransaction, Transaction};

/// Storage abstraction for settled transactions
///
/// Implementations must enforce uniqueness of `external_id`.
pub trait TransactionStore: Send + Sync {
    /// Latest `settled_at` currently stored, `None` when the store is empty
    fn max_settled_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Whether a transaction with this external identifier is stored (indexed lookup)
    fn exists_by_external_id(&self, external_id: &str) -> Result<bool>;

    /// Insert all records atomically, ignoring any whose `external_id` is
    /// already stored. Returns the number of rows actually inserted.
    fn insert_batch(&self, records: &[NewTransaction]) -> Result<usize>;

    /// Rows ordered by internal id ascending, with offset and limit applied
    fn page(&self, skip: i64, take: i64) -> Result<Vec<Transaction>>;

    /// Total number of stored transactions
    fn count(&self) -> Result<i64>;
}

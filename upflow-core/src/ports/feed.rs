//! Transaction feed port - paginated remote source of settled transactions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::NewTransaction;

/// One decoded record of a feed page
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    pub id: String,
    pub amount: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl From<FeedRecord> for NewTransaction {
    fn from(record: FeedRecord) -> Self {
        NewTransaction::new(record.id, record.amount, record.settled_at)
    }
}

/// One page of the feed, newest first, plus the cursor to the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub records: Vec<FeedRecord>,
    /// `None` (or an empty string from the remote) marks the end of the feed
    pub next: Option<String>,
}

/// Remote feed abstraction
///
/// Errors are `Error::Transport` when the remote cannot be reached or
/// answers with a non-success status, and `Error::Parse` when the body
/// does not decode into the expected shape.
pub trait TransactionFeed: Send + Sync {
    /// Cursor of the first page (settled transactions only)
    fn first_page_url(&self) -> String;

    /// Fetch and decode a single page
    fn fetch_page(&self, url: &str) -> Result<FeedPage>;
}

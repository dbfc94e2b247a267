//! Status service - summary of what is stored locally

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::result::Result;
use crate::ports::TransactionStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub transaction_count: i64,
    /// High-water mark the next sync stops at
    pub latest_settled_at: Option<DateTime<Utc>>,
}

pub struct StatusService {
    store: Arc<dyn TransactionStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub fn status(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            transaction_count: self.store.count()?,
            latest_settled_at: self.store.max_settled_at()?,
        })
    }
}

//! Paged response envelope shared by every API read and the sync trigger

use serde::{Deserialize, Serialize};

/// A page of rows plus a total count and an error flag.
///
/// Errors that the caller can act on (bad paging parameters, a failed
/// feed walk) travel inside this value rather than as an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub rows: Vec<T>,
    pub total_count: i64,
    pub error: bool,
    pub error_message: Option<String>,
}

impl<T> PagedResult<T> {
    /// Create a successful page
    pub fn ok(rows: Vec<T>, total_count: i64) -> Self {
        Self {
            rows,
            total_count,
            error: false,
            error_message: None,
        }
    }

    /// Create a failed, empty page
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            total_count: 0,
            error: true,
            error_message: Some(message.into()),
        }
    }
}

/// Row type for responses that carry only a count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

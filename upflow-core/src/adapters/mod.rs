//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the TransactionStore port
//! - Up Bank HTTP client for the TransactionFeed port
//! - In-memory map for the PageCache port

pub mod duckdb;
pub mod memory_cache;
pub mod up;

#[cfg(test)]
pub mod up_mock;

//! Core domain entities
//!
//! Plain data structures shared by the services and adapters. No I/O here.

mod paged;
pub mod result;
mod transaction;

pub use paged::{Empty, PagedResult};
pub use transaction::{amount_fits_scale, NewTransaction, Transaction, TransactionDto, AMOUNT_SCALE};

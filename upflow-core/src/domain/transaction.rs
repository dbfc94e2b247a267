//! Transaction domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places the store keeps for an amount
pub const AMOUNT_SCALE: u32 = 2;

/// Whether `amount` can be stored without rounding
pub fn amount_fits_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE
}

/// A settled transaction as stored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Locally assigned, increasing; the pagination order
    pub id: i64,
    /// Identifier assigned by the bank, unique across the store
    pub external_id: String,
    /// Signed value in base currency units
    pub amount: Decimal,
    pub settled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A transaction staged for insertion; the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewTransaction {
    pub external_id: String,
    pub amount: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn new(external_id: impl Into<String>, amount: Decimal, settled_at: DateTime<Utc>) -> Self {
        Self {
            external_id: external_id.into(),
            amount,
            settled_at,
        }
    }
}

/// Client-facing view of a stored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionDto {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            value: tx.amount,
            settled_at: tx.settled_at,
        }
    }
}

//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{amount_fits_scale, NewTransaction, Transaction, AMOUNT_SCALE};
use crate::ports::TransactionStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Timestamp layout written into TIMESTAMP columns (always UTC)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a file-backed database
    ///
    /// Retries with exponential backoff on file locking errors, which show up
    /// when another process still holds the database file.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            "Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> anyhow::Result<Connection> {
        // Extension autoloading stays off; nothing here needs an extension
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::database("database connection mutex poisoned"))
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::info!(applied = ?result.applied, "Database migrations applied");
        }
        Ok(())
    }
}

impl TransactionStore for DuckDbRepository {
    fn max_settled_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let result: Option<String> = conn.query_row(
            "SELECT MAX(settled_at)::VARCHAR FROM transactions",
            [],
            |row| row.get(0),
        )?;
        result.map(|s| parse_timestamp(&s)).transpose()
    }

    fn exists_by_external_id(&self, external_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        // external_id carries a UNIQUE constraint, so this is an index lookup
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE external_id = ?",
            params![external_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_batch(&self, records: &[NewTransaction]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        // DECIMAL(18, 2) would round anything finer
        if let Some(record) = records.iter().find(|r| !amount_fits_scale(r.amount)) {
            return Err(Error::validation(format!(
                "amount {} for {} has more than {} decimal places",
                record.amount, record.external_id, AMOUNT_SCALE
            )));
        }

        let mut conn = self.lock()?;
        let created_at = format_timestamp(&Utc::now());
        let tx = conn.transaction()?;

        let mut inserted = 0;
        {
            // ON CONFLICT keeps a racing writer from failing the whole batch
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (external_id, amount, settled_at, created_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (external_id) DO NOTHING",
            )?;

            for record in records {
                inserted += stmt.execute(params![
                    record.external_id,
                    record.amount.to_string(),
                    format_timestamp(&record.settled_at),
                    created_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn page(&self, skip: i64, take: i64) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, external_id, amount::VARCHAR, settled_at::VARCHAR, created_at::VARCHAR
             FROM transactions
             ORDER BY id
             LIMIT ? OFFSET ?",
        )?;

        let raw_rows = stmt
            .query_map(params![take, skip], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw_rows
            .into_iter()
            .map(|(id, external_id, amount, settled_at, created_at)| {
                Ok(Transaction {
                    id,
                    external_id,
                    amount: parse_amount(&amount)?,
                    settled_at: parse_timestamp(&settled_at)?,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

// Helper functions

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a TIMESTAMP rendered by DuckDB (`2024-01-15 09:30:00[.ffffff]`)
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::database(format!("invalid stored timestamp '{}': {}", s, e)))
}

fn parse_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| Error::database(format!("invalid stored amount '{}': {}", s, e)))
}

//! Migration service - applies the embedded schema scripts
//!
//! Every script is recorded in sys_migrations once it has run, so opening
//! an existing database only applies what is new.

use std::collections::HashSet;

use chrono::Utc;
use duckdb::Connection;

use crate::domain::result::Result;
use crate::migrations::MIGRATIONS;

/// Outcome of a migration run
#[derive(Debug)]
pub struct MigrationResult {
    /// Scripts applied by this run, in order
    pub applied: Vec<String>,
    /// Scripts found already recorded
    pub already_applied: usize,
}

pub struct MigrationService<'a> {
    conn: &'a Connection,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Apply every script not yet recorded
    ///
    /// The first script creates sys_migrations itself with
    /// `CREATE TABLE IF NOT EXISTS`, so it is safe to execute before the
    /// recorded set can be read.
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let (_, bootstrap) = MIGRATIONS[0];
        self.conn.execute_batch(bootstrap)?;

        let recorded: HashSet<String> = self.get_applied()?.into_iter().collect();
        let mut result = MigrationResult {
            applied: Vec::new(),
            already_applied: 0,
        };

        for (name, sql) in MIGRATIONS {
            if recorded.contains(*name) {
                result.already_applied += 1;
                continue;
            }

            tracing::debug!(migration = %name, "Applying migration");
            self.conn.execute_batch(sql)?;
            self.record_migration(name)?;
            result.applied.push(name.to_string());
        }

        Ok(result)
    }

    /// Names of recorded scripts
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Names of scripts that have not run yet
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = self.get_applied()?;
        Ok(MIGRATIONS
            .iter()
            .filter(|(name, _)| !applied.iter().any(|a| a == name))
            .map(|(name, _)| name.to_string())
            .collect())
    }

    fn record_migration(&self, name: &str) -> Result<()> {
        let applied_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sys_migrations (migration_name, applied_at) VALUES (?, ?)",
            [name, applied_at.as_str()],
        )?;
        Ok(())
    }
}

//! Embedded schema scripts
//!
//! `(name, sql)` pairs, applied in this order. The first one must create
//! `sys_migrations` idempotently; the runner executes it on every open.

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_transactions.sql", include_str!("001_transactions.sql")),
];

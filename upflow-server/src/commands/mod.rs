//! CLI command implementations

pub mod serve;
pub mod status;
pub mod sync;
pub mod transactions;

use anyhow::{Context, Result};
use upflow_core::config::{self, Config};
use upflow_core::UpflowContext;

/// Load configuration from the data directory
pub fn load_config() -> Result<Config> {
    let data_dir = config::data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create upflow directory: {:?}", data_dir))?;

    Config::load(&data_dir)
}

/// Get or create upflow context
pub fn get_context() -> Result<UpflowContext> {
    let config = load_config()?;
    tracing::debug!(database = ?config.database_path, "Opening upflow context");
    UpflowContext::new(config).context("Failed to initialize upflow context")
}

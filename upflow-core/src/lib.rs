//! UpFlow Core - incremental Up Bank transaction sync and paged reads
//!
//! Laid out as a small hexagon:
//!
//! - **domain**: transactions, paged results and the error type
//! - **ports**: traits for the store, the remote feed and the page cache
//! - **services**: sync, query and status orchestration
//! - **adapters**: DuckDB store, Up API client, in-memory cache

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use adapters::memory_cache::MemoryPageCache;
use adapters::up::UpClient;
use config::Config;
use ports::{PageCache, TransactionFeed};
use services::{QueryService, StatusService, SyncService};

pub use domain::result::Error;
pub use domain::{Empty, PagedResult, Transaction, TransactionDto};
pub use services::{StatusSummary, SyncResult};

/// Main context for UpFlow operations
///
/// Owns the store and hands the same instance to every service. The sync
/// service only exists when an Up API token is configured.
pub struct UpflowContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub query_service: QueryService,
    pub status_service: StatusService,
    sync_service: Option<SyncService>,
}

impl UpflowContext {
    /// Open the configured database and wire up the Up API client
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }

        let repository = Arc::new(DuckDbRepository::new(&config.database_path)?);
        repository.ensure_schema()?;

        let feed: Option<Arc<dyn TransactionFeed>> = match config.up_api_token.as_deref() {
            Some(token) => {
                let mut client = UpClient::new_with_base_url(token, &config.up_base_url)?;
                if let Some(size) = config.page_size {
                    client = client.with_page_size(size);
                }
                Some(Arc::new(client))
            }
            None => {
                tracing::warn!("No Up API token configured; synchronization is disabled");
                None
            }
        };

        let cache: Arc<dyn PageCache> = match config.cache_ttl {
            Some(ttl) => Arc::new(MemoryPageCache::with_ttl(ttl)),
            None => Arc::new(MemoryPageCache::new()),
        };

        Ok(Self::from_parts(config, repository, feed, cache))
    }

    /// Assemble a context from already-built collaborators
    pub fn from_parts(
        config: Config,
        repository: Arc<DuckDbRepository>,
        feed: Option<Arc<dyn TransactionFeed>>,
        cache: Arc<dyn PageCache>,
    ) -> Self {
        let query_service = QueryService::new(repository.clone(), cache);
        let status_service = StatusService::new(repository.clone());
        let sync_service = feed.map(|feed| SyncService::new(repository.clone(), feed));

        Self {
            config,
            repository,
            query_service,
            status_service,
            sync_service,
        }
    }

    /// The sync service, or a configuration error when no token is set
    pub fn sync_service(&self) -> std::result::Result<&SyncService, Error> {
        match &self.sync_service {
            Some(service) => Ok(service),
            None => Err(self.config.require_token().err().unwrap_or_else(|| {
                Error::Config("Up Bank synchronization is not configured".to_string())
            })),
        }
    }
}

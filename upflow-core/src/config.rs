//! Configuration management
//!
//! Settings come from an optional `settings.json` in the data directory:
//! ```json
//! {
//!   "upApiToken": "up:yeah:...",
//!   "upBaseUrl": "https://api.up.com.au/api/v1",
//!   "database": "/var/lib/upflow/upflow.duckdb",
//!   "listenAddr": "127.0.0.1:5000",
//!   "cacheTtlSecs": 300,
//!   "pageSize": 100,
//!   "corsOrigins": ["http://localhost:3000"]
//! }
//! ```
//! Environment variables override the file. `pageSize` must be between 1
//! and 100, the most Up Bank returns per page.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::up::{UP_BASE_URL_ENV, UP_PRODUCTION_URL};
use crate::domain::result::Error;

pub const DIR_ENV: &str = "UPFLOW_DIR";
pub const TOKEN_ENV: &str = "UP_API_TOKEN";
pub const DATABASE_ENV: &str = "UPFLOW_DATABASE";
pub const LISTEN_ADDR_ENV: &str = "UPFLOW_LISTEN_ADDR";
pub const CACHE_TTL_ENV: &str = "UPFLOW_CACHE_TTL_SECS";
pub const PAGE_SIZE_ENV: &str = "UPFLOW_PAGE_SIZE";

/// Largest page Up Bank serves
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DATABASE_FILENAME: &str = "upflow.duckdb";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    up_api_token: Option<String>,
    #[serde(default)]
    up_base_url: Option<String>,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    listen_addr: Option<String>,
    #[serde(default)]
    cache_ttl_secs: Option<u64>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    cors_origins: Option<Vec<String>>,
}

/// UpFlow configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub up_api_token: Option<String>,
    pub up_base_url: String,
    pub database_path: PathBuf,
    pub listen_addr: SocketAddr,
    /// `None` keeps cached pages for the life of the process
    pub cache_ttl: Option<Duration>,
    pub page_size: Option<u32>,
    pub cors_origins: Vec<String>,
}

/// Data directory from `UPFLOW_DIR`, or `~/.upflow`
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".upflow"))
        .context("Could not find home directory; set UPFLOW_DIR")
}

impl Config {
    /// Load config from the data directory, then apply environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        Self::resolve(data_dir, raw, |key| std::env::var(key).ok())
    }

    /// Merge file settings with overrides from `lookup`
    fn resolve(
        data_dir: &Path,
        raw: SettingsFile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let up_api_token = non_empty(TOKEN_ENV).or(raw.up_api_token);

        let up_base_url = non_empty(UP_BASE_URL_ENV)
            .or(raw.up_base_url)
            .unwrap_or_else(|| UP_PRODUCTION_URL.to_string());

        let database_path = non_empty(DATABASE_ENV)
            .or(raw.database)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DATABASE_FILENAME));

        let listen_addr = non_empty(LISTEN_ADDR_ENV)
            .or(raw.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", listen_addr))?;

        let cache_ttl_secs = match non_empty(CACHE_TTL_ENV) {
            Some(v) => Some(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid {}: {}", CACHE_TTL_ENV, v))?,
            ),
            None => raw.cache_ttl_secs,
        };

        let page_size = match non_empty(PAGE_SIZE_ENV) {
            Some(v) => Some(
                v.trim()
                    .parse::<u32>()
                    .with_context(|| format!("Invalid {}: {}", PAGE_SIZE_ENV, v))?,
            ),
            None => raw.page_size,
        };
        if let Some(size) = page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                anyhow::bail!(
                    "Invalid page size {}: must be between 1 and {}",
                    size,
                    MAX_PAGE_SIZE
                );
            }
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            up_api_token,
            up_base_url,
            database_path,
            listen_addr,
            cache_ttl: cache_ttl_secs.map(Duration::from_secs),
            page_size,
            cors_origins: raw
                .cors_origins
                .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]),
        })
    }

    /// The Up API token, or a configuration error when none is set
    pub fn require_token(&self) -> std::result::Result<&str, Error> {
        self.up_api_token.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "Up API token not configured. Set {} or upApiToken in settings.json",
                TOKEN_ENV
            ))
        })
    }
}

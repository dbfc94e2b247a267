//! Up Bank API client
//!
//! Walks the settled-transactions feed one page at a time. Each response
//! carries a `links.next` cursor that points at the following page.
//!
//! API Documentation: https://developer.up.com.au

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{amount_fits_scale, AMOUNT_SCALE};
use crate::ports::{FeedPage, FeedRecord, TransactionFeed};

// =============================================================================
// API Response Models (matching the Up API transactions resource)
// =============================================================================

/// Wrapper for the transactions list response
#[derive(Debug, Clone, Deserialize)]
struct TransactionsResponse {
    data: Vec<UpTransaction>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<String>,
}

/// Up transaction resource
#[derive(Debug, Clone, Deserialize)]
pub struct UpTransaction {
    pub id: Uuid,
    pub attributes: UpTransactionAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpTransactionAttributes {
    pub amount: UpMoney,
    /// Always present for SETTLED transactions
    pub settled_at: DateTime<Utc>,
}

/// Money object; `value` is a decimal string such as "-12.50"
#[derive(Debug, Clone, Deserialize)]
pub struct UpMoney {
    pub value: Decimal,
}

impl From<UpTransaction> for FeedRecord {
    fn from(tx: UpTransaction) -> Self {
        FeedRecord {
            id: tx.id.to_string(),
            amount: tx.attributes.amount.value,
            settled_at: tx.attributes.settled_at,
        }
    }
}

/// Decode one response body into a feed page
pub fn parse_page(body: &str) -> Result<FeedPage> {
    let response: TransactionsResponse = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("Failed to parse Up Bank transactions: {}", e)))?;

    if let Some(tx) = response
        .data
        .iter()
        .find(|tx| !amount_fits_scale(tx.attributes.amount.value))
    {
        return Err(Error::parse(format!(
            "Up Bank amount {} for transaction {} has more than {} decimal places",
            tx.attributes.amount.value, tx.id, AMOUNT_SCALE
        )));
    }

    Ok(FeedPage {
        records: response.data.into_iter().map(FeedRecord::from).collect(),
        next: response.links.next.filter(|next| !next.is_empty()),
    })
}

// =============================================================================
// Up HTTP Client
// =============================================================================

/// Default production API URL
pub const UP_PRODUCTION_URL: &str = "https://api.up.com.au/api/v1";

/// Environment variable to override the Up API base URL.
pub const UP_BASE_URL_ENV: &str = "UP_API_BASE_URL";

/// Request timeout for every call to the Up API
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Up API client
#[derive(Debug)]
pub struct UpClient {
    client: Client,
    token: String,
    base_url: String,
    page_size: Option<u32>,
}

impl UpClient {
    /// Create a new Up client against the production API
    pub fn new(token: &str) -> anyhow::Result<Self> {
        Self::new_with_base_url(token, UP_PRODUCTION_URL)
    }

    /// Create a new Up client against a custom base URL.
    pub fn new_with_base_url(token: &str, base_url: &str) -> anyhow::Result<Self> {
        if token.is_empty() {
            anyhow::bail!("Up API token cannot be empty");
        }

        url::Url::parse(base_url)
            .with_context(|| format!("Invalid Up API base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: None,
        })
    }

    /// Ask the API for pages of this size instead of its default
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Check that the API is reachable and accepts the token
    pub fn ping(&self) -> Result<()> {
        let url = format!("{}/util/ping", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(map_request_error)?;

        check_response_status(&response)
    }
}

impl TransactionFeed for UpClient {
    fn first_page_url(&self) -> String {
        let mut url = format!("{}/transactions?filter[status]=SETTLED", self.base_url);
        if let Some(size) = self.page_size {
            url.push_str(&format!("&page[size]={}", size));
        }
        url
    }

    fn fetch_page(&self, url: &str) -> Result<FeedPage> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(map_request_error)?;

        check_response_status(&response)?;

        let body = response
            .text()
            .map_err(|e| Error::transport(format!("Failed to read Up Bank response: {}", e)))?;

        parse_page(&body)
    }
}

/// Map request errors to user-friendly messages
fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::transport(format!(
            "Connection to Up Bank timed out after {} seconds",
            REQUEST_TIMEOUT_SECS
        ))
    } else if error.is_connect() {
        Error::transport("Unable to connect to Up Bank servers")
    } else {
        Error::transport(format!("Up Bank request failed: {}", error))
    }
}

fn check_response_status(response: &reqwest::blocking::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    Err(Error::transport(format!(
        "Failed to get Up Bank transactions. Status code {}. Reason: {}.",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )))
}

// =============================================================================
// Tests
// =============================================================================

//! Investing.com API client.
//!
//! Two endpoints: free-text symbol search (instrument discovery) and
//! price snapshots keyed by instrument identifier.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::clients::MarketDataProvider;
use crate::types::{InstrumentMatch, PriceSnapshot};

const DEFAULT_SEARCH_BASE_URL: &str = "https://api.investing.com";
const DEFAULT_QUOTE_BASE_URL: &str = "https://endpoints.investing.com";

#[derive(Debug, Clone)]
pub struct InvestingClient {
    client: Client,
    search_base_url: String,
    quote_base_url: String,
}

impl InvestingClient {
    /// Create a client against the production endpoints.
    ///
    /// No request timeout is set here: a hung request only delays its own
    /// placeholder's branch of a cycle, never the other placeholders.
    pub fn new() -> Self {
        Self::with_base_urls(DEFAULT_SEARCH_BASE_URL, DEFAULT_QUOTE_BASE_URL)
    }

    /// Create a client against custom endpoints (tests, proxies).
    pub fn with_base_urls(
        search_base_url: impl Into<String>,
        quote_base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .user_agent("stockbadge/0.1")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            search_base_url: search_base_url.into(),
            quote_base_url: quote_base_url.into(),
        }
    }
}

impl Default for InvestingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for InvestingClient {
    async fn search_instrument(&self, symbol: &str) -> Result<Option<InstrumentMatch>> {
        let url = format!("{}/api/search/v2/search", self.search_base_url);

        debug!("Searching instrument for symbol {}", symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("q", symbol)])
            .send()
            .await
            .context("Failed to reach symbol search endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Symbol search error: {} - {}", status, body));
        }

        let result: SearchResponse = response
            .json()
            .await
            .context("Failed to parse symbol search response")?;

        Ok(result.quotes.into_iter().next().map(|quote| InstrumentMatch {
            instrument_id: quote.id.to_string(),
            symbol: quote.symbol,
            name: quote.description,
            exchange: quote.exchange,
        }))
    }

    async fn quote(&self, instrument_id: &str) -> Result<PriceSnapshot> {
        let url = format!(
            "{}/pd-instruments/v1/instruments?instrument_ids={}",
            self.quote_base_url, instrument_id
        );

        debug!("Fetching price snapshot from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach price endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Price endpoint error: {} - {}", status, body));
        }

        let records: Vec<InstrumentRecord> = response
            .json()
            .await
            .context("Failed to parse price response")?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty price payload for instrument {}", instrument_id))?;

        let price = record.price.unwrap_or_default();

        Ok(PriceSnapshot {
            symbol: record.symbol.unwrap_or_default(),
            change: price.change,
            change_percent: price.change_percent,
            fetched_at: Utc::now(),
        })
    }
}

/// Response shape of the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    id: i64,
    symbol: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    exchange: Option<String>,
}

/// Per-identifier record from the price endpoint. Missing numeric fields
/// read as zero, matching how the badge treats an unchanged price.
#[derive(Debug, Deserialize)]
struct InstrumentRecord {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    price: Option<PriceFields>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceFields {
    #[serde(default)]
    change: f64,
    #[serde(default)]
    change_percent: f64,
}

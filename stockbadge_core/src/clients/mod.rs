//! External market data API clients.

pub mod investing;

pub use investing::InvestingClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{InstrumentMatch, PriceSnapshot};

/// Common interface for symbol search and price snapshot providers.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Search for a free-text symbol. The response is a ranked candidate
    /// list; only the best-ranked candidate is returned. An empty result
    /// set is `Ok(None)`, not an error.
    async fn search_instrument(&self, symbol: &str) -> Result<Option<InstrumentMatch>>;

    /// Fetch the current price snapshot for one instrument identifier.
    async fn quote(&self, instrument_id: &str) -> Result<PriceSnapshot>;
}

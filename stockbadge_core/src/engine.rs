//! Resolve-and-render cycle over a snapshot of placeholders.

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::badge;
use crate::clients::MarketDataProvider;
use crate::instrument_cache::InstrumentCache;
use crate::types::{BadgeUpdate, Placeholder};

/// Drives one full resolve+fetch+render pass over the placeholders of a
/// page, sharing one identifier cache across all cycles of its lifetime.
pub struct TickerEngine<P> {
    provider: P,
    cache: InstrumentCache,
}

impl<P: MarketDataProvider> TickerEngine<P> {
    pub fn new(provider: P) -> Self {
        Self::with_cache(provider, InstrumentCache::new())
    }

    /// Create with an injected cache, so tests can supply a fresh instance.
    pub fn with_cache(provider: P, cache: InstrumentCache) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &InstrumentCache {
        &self.cache
    }

    /// Run one full cycle over a snapshot of placeholders.
    ///
    /// All branches run concurrently and the cycle settles only once every
    /// branch has. A failed branch yields no update, leaving its
    /// placeholder untouched until the next scheduled cycle; it never
    /// blocks or fails the other branches.
    pub async fn run_cycle(&self, placeholders: Vec<Placeholder>) -> Vec<BadgeUpdate> {
        if placeholders.is_empty() {
            return Vec::new();
        }
        let total = placeholders.len();

        // Resolve each distinct symbol without an explicit identifier
        // first, so search runs at most once per symbol even when a page
        // repeats a ticker.
        let mut symbols: Vec<&str> = placeholders
            .iter()
            .filter(|p| p.instrument_id.is_none())
            .map(|p| p.symbol.trim())
            .collect();
        // Same normalization the cache key uses, so " NVDA " and "NVDA"
        // collapse to one search.
        symbols.sort_unstable_by_key(|s| s.to_uppercase());
        symbols.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        join_all(symbols.into_iter().map(|s| self.resolve_symbol(s))).await;

        let updates: Vec<BadgeUpdate> =
            join_all(placeholders.into_iter().map(|p| self.update_one(p)))
                .await
                .into_iter()
                .flatten()
                .collect();

        info!("Cycle complete: {}/{} placeholders updated", updates.len(), total);
        updates
    }

    /// Populate the cache for one symbol. Failures are reported to the log
    /// stream only; the affected placeholders simply stay unloaded.
    async fn resolve_symbol(&self, symbol: &str) {
        if self.cache.get(symbol).await.is_some() {
            debug!("Cache hit for {}", symbol);
            return;
        }

        match self.provider.search_instrument(symbol).await {
            Ok(Some(found)) => {
                debug!("Resolved {} -> {} via search", symbol, found.instrument_id);
                self.cache.insert(symbol, &found.instrument_id).await;
            }
            Ok(None) => {
                warn!("No instrument match for symbol {}", symbol);
            }
            Err(e) => {
                warn!("Symbol search failed for {}: {}", symbol, e);
            }
        }
    }

    async fn update_one(&self, placeholder: Placeholder) -> Option<BadgeUpdate> {
        // Strict precedence: explicit attribute, then cache (which the
        // resolution pass has already topped up via search).
        let instrument_id = match &placeholder.instrument_id {
            Some(id) => id.clone(),
            None => match self.cache.get(&placeholder.symbol).await {
                Some(id) => id,
                None => return None, // resolution failure already reported
            },
        };

        match self.provider.quote(&instrument_id).await {
            Ok(snapshot) => {
                let badge_html = badge::render(placeholder.kind, &placeholder.symbol, &snapshot);
                Some(BadgeUpdate {
                    placeholder,
                    badge_html,
                })
            }
            Err(e) => {
                warn!(
                    "Price fetch failed for {} (instrument {}): {}",
                    placeholder.symbol, instrument_id, e
                );
                None
            }
        }
    }
}

//! Cycle-level engine tests with a scripted market data provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use stockbadge_core::clients::MarketDataProvider;
use stockbadge_core::types::{InstrumentMatch, Placeholder, PlaceholderKind, PriceSnapshot};
use stockbadge_core::{page, TickerEngine};

/// Provider backed by fixed tables. Symbols absent from `instruments`
/// produce an empty search result; identifiers absent from `quotes`
/// produce a failed price fetch.
#[derive(Default)]
struct ScriptedProvider {
    instruments: HashMap<String, String>,
    quotes: HashMap<String, (f64, f64)>,
    search_calls: Arc<Mutex<Vec<String>>>,
    quote_calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self::default()
    }

    fn instrument(mut self, symbol: &str, instrument_id: &str) -> Self {
        self.instruments
            .insert(symbol.to_string(), instrument_id.to_string());
        self
    }

    fn price(mut self, instrument_id: &str, change: f64, change_percent: f64) -> Self {
        self.quotes
            .insert(instrument_id.to_string(), (change, change_percent));
        self
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn search_instrument(&self, symbol: &str) -> Result<Option<InstrumentMatch>> {
        self.search_calls.lock().unwrap().push(symbol.to_string());
        Ok(self.instruments.get(symbol).map(|id| InstrumentMatch {
            instrument_id: id.clone(),
            symbol: symbol.to_string(),
            name: format!("{} Inc", symbol),
            exchange: None,
        }))
    }

    async fn quote(&self, instrument_id: &str) -> Result<PriceSnapshot> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let (change, change_percent) = self
            .quotes
            .get(instrument_id)
            .copied()
            .ok_or_else(|| anyhow!("Price endpoint error: 500 for {}", instrument_id))?;
        Ok(PriceSnapshot {
            symbol: String::new(),
            change,
            change_percent,
            fetched_at: Utc::now(),
        })
    }
}

#[tokio::test]
async fn test_explicit_identifier_never_searches() {
    let provider = ScriptedProvider::new().price("6497", 1.0, 0.5);
    let search_calls = provider.search_calls.clone();
    let engine = TickerEngine::new(provider);

    let placeholders =
        vec![Placeholder::new(PlaceholderKind::Inline, "NVDA").with_instrument_id("6497")];
    let updates = engine.run_cycle(placeholders).await;

    assert_eq!(updates.len(), 1);
    assert!(search_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_runs_once_per_symbol() {
    let provider = ScriptedProvider::new()
        .instrument("NVDA", "6497")
        .price("6497", 1.0, 0.5);
    let search_calls = provider.search_calls.clone();
    let engine = TickerEngine::new(provider);

    // Same symbol repeated within one cycle.
    let placeholders = vec![
        Placeholder::new(PlaceholderKind::Inline, "NVDA"),
        Placeholder::new(PlaceholderKind::Card, "NVDA"),
    ];
    let updates = engine.run_cycle(placeholders).await;
    assert_eq!(updates.len(), 2);
    assert_eq!(search_calls.lock().unwrap().len(), 1);

    // A later cycle reuses the cached identifier.
    let updates = engine
        .run_cycle(vec![Placeholder::new(PlaceholderKind::PostMeta, "NVDA")])
        .await;
    assert_eq!(updates.len(), 1);
    assert_eq!(search_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_padded_symbol_shares_one_search() {
    let provider = ScriptedProvider::new()
        .instrument("NVDA", "6497")
        .price("6497", 1.0, 0.5);
    let search_calls = provider.search_calls.clone();
    let engine = TickerEngine::new(provider);

    // Sloppy markup: same ticker once padded with whitespace. The cache
    // key normalizes, so resolution must too.
    let placeholders = vec![
        Placeholder::new(PlaceholderKind::Inline, " NVDA "),
        Placeholder::new(PlaceholderKind::Card, "NVDA"),
    ];
    let updates = engine.run_cycle(placeholders).await;

    assert_eq!(updates.len(), 2);
    assert_eq!(*search_calls.lock().unwrap(), vec!["NVDA".to_string()]);
}

#[tokio::test]
async fn test_one_failure_does_not_block_others() {
    // Five placeholders; TSLA's price fetch fails.
    let provider = ScriptedProvider::new()
        .instrument("NVDA", "6497")
        .instrument("AAPL", "6408")
        .instrument("MSFT", "20")
        .instrument("AMZN", "6435")
        .instrument("TSLA", "13994")
        .price("6497", 1.0, 0.5)
        .price("6408", -0.2, -0.1)
        .price("20", 0.0, 0.0)
        .price("6435", 3.3, 1.8);
    let engine = TickerEngine::new(provider);

    let placeholders = ["NVDA", "AAPL", "MSFT", "AMZN", "TSLA"]
        .into_iter()
        .map(|s| Placeholder::new(PlaceholderKind::Inline, s))
        .collect();
    let updates = engine.run_cycle(placeholders).await;

    assert_eq!(updates.len(), 4);
    assert!(updates.iter().all(|u| u.placeholder.symbol != "TSLA"));
}

#[tokio::test]
async fn test_unresolvable_symbol_yields_no_update() {
    let provider = ScriptedProvider::new();
    let quote_calls = provider.quote_calls.clone();
    let engine = TickerEngine::new(provider);

    let updates = engine
        .run_cycle(vec![Placeholder::new(PlaceholderKind::Inline, "NOPE")])
        .await;

    assert!(updates.is_empty());
    assert_eq!(quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_cycle_is_a_noop() {
    let provider = ScriptedProvider::new();
    let search_calls = provider.search_calls.clone();
    let engine = TickerEngine::new(provider);

    let updates = engine.run_cycle(Vec::new()).await;
    assert!(updates.is_empty());
    assert!(search_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_page_round_trip_with_partial_failure() {
    let html = concat!(
        r#"<p><span class="stock-ticker" data-symbol="NVDA">NVDA</span></p>"#,
        r#"<p><span class="stock-ticker" data-symbol="TSLA">TSLA</span></p>"#,
    );

    let provider = ScriptedProvider::new()
        .instrument("NVDA", "6497")
        .instrument("TSLA", "13994")
        .price("6497", 1.23, 1.234);
    let engine = TickerEngine::new(provider);

    let updates = engine.run_cycle(page::scan(html)).await;
    let rendered = page::apply_updates(html, &updates);

    // NVDA: up badge with a plus-signed two-decimal percent.
    assert!(rendered.contains(
        r#"<span class="stock-ticker ticker-loaded" data-symbol="NVDA"><span class="stock-badge badge-up">NVDA ▲ +1.23%</span></span>"#
    ));
    // TSLA's fetch failed: original markup, no loaded marker.
    assert!(rendered.contains(r#"<span class="stock-ticker" data-symbol="TSLA">TSLA</span>"#));
}

#[tokio::test]
async fn test_placeholder_removed_between_cycles() {
    let provider = ScriptedProvider::new()
        .instrument("NVDA", "6497")
        .instrument("AAPL", "6408")
        .price("6497", 1.0, 0.5)
        .price("6408", -0.2, -0.1);
    let engine = TickerEngine::new(provider);

    let first = concat!(
        r#"<span class="stock-ticker" data-symbol="NVDA">NVDA</span>"#,
        r#"<span class="stock-ticker" data-symbol="AAPL">AAPL</span>"#,
    );
    assert_eq!(engine.run_cycle(page::scan(first)).await.len(), 2);

    // AAPL's element is gone by the second cycle; its absence is not an error.
    let second = r#"<span class="stock-ticker" data-symbol="NVDA">NVDA</span>"#;
    let updates = engine.run_cycle(page::scan(second)).await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].placeholder.symbol, "NVDA");
}

//! Stockbadge Core - stock price badges for static content sites.
//!
//! This library provides:
//! - Placeholder discovery in rendered HTML pages (CSS-class markers)
//! - Instrument identifier resolution: explicit attribute, process-wide
//!   cache, symbol search (strict precedence, in that order)
//! - Price snapshot fetching from the Investing.com endpoints
//! - Badge rendering per placeholder variant
//! - A cycle engine that updates all placeholders concurrently

pub mod badge;
pub mod clients;
pub mod engine;
pub mod instrument_cache;
pub mod page;
pub mod types;

pub use engine::TickerEngine;
pub use instrument_cache::InstrumentCache;
pub use types::*;

//! Core domain types for ticker badge resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder variant, identified by its marker class. Variants differ
/// only in rendered markup, never in resolution logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    /// Generic inline ticker inside running text.
    Inline,
    /// Compact badge on a content card (no symbol label).
    Card,
    /// Badge in a post's meta line.
    PostMeta,
}

impl PlaceholderKind {
    /// CSS class marking a placeholder element of this kind.
    pub fn marker_class(&self) -> &'static str {
        match self {
            PlaceholderKind::Inline => "stock-ticker",
            PlaceholderKind::Card => "stock-card-ticker",
            PlaceholderKind::PostMeta => "post-meta-ticker",
        }
    }

    /// Identify the variant from an element's class list, if any class
    /// is a placeholder marker.
    pub fn from_classes<'a, I>(classes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        const KINDS: [PlaceholderKind; 3] = [
            PlaceholderKind::Inline,
            PlaceholderKind::Card,
            PlaceholderKind::PostMeta,
        ];
        for class in classes {
            for kind in KINDS {
                if class == kind.marker_class() {
                    return Some(kind);
                }
            }
        }
        None
    }
}

/// A page element awaiting a rendered price badge.
///
/// Present in the page markup at load; mutated in place (content replaced,
/// loaded marker class added) once resolution succeeds; never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Display symbol from `data-symbol` (required in markup).
    pub symbol: String,
    /// Exchange label from `data-exchange`; display hint only.
    pub exchange: Option<String>,
    /// Explicit identifier from `data-instrument-id`. Takes precedence
    /// over cache and search when present.
    pub instrument_id: Option<String>,
}

impl Placeholder {
    pub fn new(kind: PlaceholderKind, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            exchange: None,
            instrument_id: None,
        }
    }

    pub fn with_instrument_id(mut self, instrument_id: impl Into<String>) -> Self {
        self.instrument_id = Some(instrument_id.into());
        self
    }
}

/// Best-ranked candidate returned by a symbol search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentMatch {
    /// Opaque token the price API uses to key this instrument.
    pub instrument_id: String,
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
}

/// Result of one price fetch. Used once to render a badge, not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Symbol label as reported by the price API; may be empty.
    pub symbol: String,
    /// Absolute price change.
    pub change: f64,
    /// Percentage price change.
    pub change_percent: f64,
    pub fetched_at: DateTime<Utc>,
}

/// A rendered badge destined for one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeUpdate {
    pub placeholder: Placeholder,
    pub badge_html: String,
}

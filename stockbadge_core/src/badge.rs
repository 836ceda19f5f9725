//! Badge rendering: movement direction, percent formatting and markup.

use crate::types::{PlaceholderKind, PriceSnapshot};

/// Price movement direction, derived from the sign of the absolute change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Flat,
    Down,
}

impl Direction {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Flat => "―",
            Direction::Down => "▼",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Direction::Up => "badge-up",
            Direction::Flat => "badge-neutral",
            Direction::Down => "badge-down",
        }
    }
}

/// Two-decimal percent string with an explicit `+` only for upward moves.
/// Downward moves keep the single `-` the number itself carries.
pub fn format_change_percent(direction: Direction, change_percent: f64) -> String {
    let sign = if direction == Direction::Up { "+" } else { "" };
    format!("{}{:.2}%", sign, change_percent)
}

/// Render the badge markup for one placeholder variant.
///
/// The displayed symbol is the snapshot's label when the API provides one,
/// otherwise the placeholder's own display symbol.
pub fn render(kind: PlaceholderKind, fallback_symbol: &str, snapshot: &PriceSnapshot) -> String {
    let direction = Direction::from_change(snapshot.change);
    let percent = format_change_percent(direction, snapshot.change_percent);
    let symbol = if snapshot.symbol.is_empty() {
        fallback_symbol
    } else {
        snapshot.symbol.as_str()
    };

    match kind {
        PlaceholderKind::Inline => format!(
            r#"<span class="stock-badge {}">{} {} {}</span>"#,
            direction.css_class(),
            symbol,
            direction.icon(),
            percent
        ),
        PlaceholderKind::Card => format!(
            r#"<span class="stock-card-badge {}">{} {}</span>"#,
            direction.css_class(),
            direction.icon(),
            percent
        ),
        PlaceholderKind::PostMeta => format!(
            r#"<span class="post-ticker-badge {}">{} {} {}</span>"#,
            direction.css_class(),
            symbol,
            direction.icon(),
            percent
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(symbol: &str, change: f64, change_percent: f64) -> PriceSnapshot {
        PriceSnapshot {
            symbol: symbol.to_string(),
            change,
            change_percent,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_direction_from_change() {
        assert_eq!(Direction::from_change(1.23), Direction::Up);
        assert_eq!(Direction::from_change(-0.5), Direction::Down);
        assert_eq!(Direction::from_change(0.0), Direction::Flat);
    }

    #[test]
    fn test_positive_change_gets_plus_sign() {
        let html = render(PlaceholderKind::Inline, "NVDA", &snapshot("NVDA", 1.23, 1.234));
        assert_eq!(
            html,
            r#"<span class="stock-badge badge-up">NVDA ▲ +1.23%</span>"#
        );
    }

    #[test]
    fn test_zero_change_is_neutral_and_unsigned() {
        let html = render(PlaceholderKind::Inline, "MSFT", &snapshot("MSFT", 0.0, 0.0));
        assert_eq!(
            html,
            r#"<span class="stock-badge badge-neutral">MSFT ― 0.00%</span>"#
        );
    }

    #[test]
    fn test_negative_change_keeps_single_minus() {
        let html = render(PlaceholderKind::Inline, "TSLA", &snapshot("TSLA", -0.5, -0.50));
        assert_eq!(
            html,
            r#"<span class="stock-badge badge-down">TSLA ▼ -0.50%</span>"#
        );
    }

    #[test]
    fn test_card_variant_omits_symbol() {
        let html = render(PlaceholderKind::Card, "AAPL", &snapshot("AAPL", 2.0, 0.875));
        assert_eq!(
            html,
            r#"<span class="stock-card-badge badge-up">▲ +0.88%</span>"#
        );
    }

    #[test]
    fn test_post_meta_variant() {
        let html = render(PlaceholderKind::PostMeta, "AMZN", &snapshot("AMZN", -3.1, -1.6));
        assert_eq!(
            html,
            r#"<span class="post-ticker-badge badge-down">AMZN ▼ -1.60%</span>"#
        );
    }

    #[test]
    fn test_empty_api_symbol_falls_back_to_placeholder() {
        let html = render(PlaceholderKind::Inline, "0700", &snapshot("", 0.4, 0.12));
        assert_eq!(
            html,
            r#"<span class="stock-badge badge-up">0700 ▲ +0.12%</span>"#
        );
    }
}

//! Placeholder discovery and badge splicing over static HTML.
//!
//! Discovery parses the document with `scraper` and reads the placeholder
//! data attributes. Splicing works on the raw text instead, so markup the
//! cycle did not touch survives byte-for-byte. A rendered badge nests
//! same-named elements inside the placeholder, so the close-tag search
//! tracks nesting depth rather than taking the first match.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use crate::types::{BadgeUpdate, Placeholder, PlaceholderKind};

/// Class added to a placeholder once a badge has been rendered into it.
pub const LOADED_CLASS: &str = "ticker-loaded";

const PLACEHOLDER_SELECTOR: &str = ".stock-ticker, .stock-card-ticker, .post-meta-ticker";

// The crate builds regex without its Unicode tables, so the patterns spell
// out ASCII whitespace instead of using \s.
const WS: &str = r"[ \t\r\n]";

fn start_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Start tags only; quoted attribute values may contain '>'.
    RE.get_or_init(|| {
        Regex::new(r#"<([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("start tag pattern is valid")
    })
}

fn class_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r#"(?:^|{ws})class{ws}*={ws}*"([^"]*)""#, ws = WS))
            .expect("class attribute pattern is valid")
    })
}

fn symbol_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r#"(?:^|{ws})data-symbol{ws}*={ws}*"([^"]*)""#, ws = WS))
            .expect("data-symbol attribute pattern is valid")
    })
}

/// Snapshot of all placeholder elements currently present, in document
/// order. Elements added to the page afterwards are picked up by the next
/// cycle's scan.
pub fn scan(html: &str) -> Vec<Placeholder> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(PLACEHOLDER_SELECTOR).expect("placeholder selector is valid");

    let mut placeholders = Vec::new();
    for element in document.select(&selector) {
        let value = element.value();
        let kind = match PlaceholderKind::from_classes(value.classes()) {
            Some(kind) => kind,
            None => continue,
        };
        let symbol = match value.attr("data-symbol") {
            Some(symbol) if !symbol.trim().is_empty() => symbol,
            _ => {
                warn!("Placeholder without data-symbol skipped");
                continue;
            }
        };

        placeholders.push(Placeholder {
            kind,
            symbol: symbol.to_string(),
            exchange: value.attr("data-exchange").map(str::to_string),
            instrument_id: value.attr("data-instrument-id").map(str::to_string),
        });
    }
    placeholders
}

/// Replace each updated placeholder's content with its badge markup and
/// mark the element loaded. Placeholders without an update, and everything
/// around them, are left untouched.
///
/// Updates are consumed in document order per (kind, symbol) pair, so
/// duplicate symbols map one-to-one onto duplicate placeholders.
pub fn apply_updates(html: &str, updates: &[BadgeUpdate]) -> String {
    if updates.is_empty() {
        return html.to_string();
    }

    let mut pending: Vec<Option<&BadgeUpdate>> = updates.iter().map(Some).collect();

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0usize;

    for caps in start_tag_re().captures_iter(html) {
        let whole = caps.get(0).expect("regex always has a full match");
        if whole.start() < cursor {
            // Inside an element we already rewrote.
            continue;
        }
        let tag = &caps[1];
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let classes = attr_value(class_attr_re(), attrs).unwrap_or_default();
        let kind = match PlaceholderKind::from_classes(classes.split_whitespace()) {
            Some(kind) => kind,
            None => continue,
        };
        let symbol = match attr_value(symbol_attr_re(), attrs) {
            Some(symbol) => symbol,
            None => continue,
        };

        let slot = pending.iter_mut().find(|slot| {
            matches!(slot, Some(u) if u.placeholder.kind == kind && u.placeholder.symbol == symbol)
        });
        let update = match slot {
            Some(slot) => slot.take().expect("slot matched as Some"),
            None => continue,
        };

        let close = format!("</{}>", tag);
        let close_start = match find_matching_close(html, whole.end(), tag) {
            Some(offset) => offset,
            None => {
                warn!("Unclosed placeholder element for {}, leaving as-is", symbol);
                continue;
            }
        };

        out.push_str(&html[cursor..whole.start()]);
        out.push('<');
        out.push_str(tag);
        out.push_str(&mark_loaded(attrs));
        out.push('>');
        out.push_str(&update.badge_html);
        out.push_str(&close);
        cursor = close_start + close.len();
    }

    out.push_str(&html[cursor..]);
    out
}

/// Offset of the close tag matching the start tag that ended at `pos`,
/// skipping over same-named elements nested inside (a previously rendered
/// badge puts a `<span>` inside a `<span>` placeholder).
fn find_matching_close(html: &str, pos: usize, tag: &str) -> Option<usize> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut depth = 1usize;
    let mut scan = pos;
    loop {
        let close_at = scan + html[scan..].find(&close)?;

        // Nested start tags between the scan point and this close.
        let mut inner = scan;
        while let Some(open_off) = html[inner..close_at].find(&open) {
            let open_at = inner + open_off;
            // Only count `<tag ` / `<tag>`, not a longer tag name sharing
            // the prefix.
            match html.as_bytes().get(open_at + open.len()) {
                Some(b' ' | b'\t' | b'\r' | b'\n' | b'>') => depth += 1,
                _ => {}
            }
            inner = open_at + open.len();
        }

        depth -= 1;
        if depth == 0 {
            return Some(close_at);
        }
        scan = close_at + close.len();
    }
}

/// Extract a double-quoted attribute value from a raw attribute string.
fn attr_value(re: &Regex, attrs: &str) -> Option<String> {
    re.captures(attrs).map(|caps| caps[1].to_string())
}

/// Append the loaded marker to the class attribute, once.
fn mark_loaded(attrs: &str) -> String {
    match class_attr_re().captures(attrs) {
        Some(caps) => {
            let classes = &caps[1];
            if classes.split_whitespace().any(|class| class == LOADED_CLASS) {
                return attrs.to_string();
            }

            let value = caps.get(1).expect("pattern has a capture group");
            let mut out = String::with_capacity(attrs.len() + LOADED_CLASS.len() + 1);
            out.push_str(&attrs[..value.end()]);
            if !classes.is_empty() {
                out.push(' ');
            }
            out.push_str(LOADED_CLASS);
            out.push_str(&attrs[value.end()..]);
            out
        }
        None => format!(r#"{} class="{}""#, attrs, LOADED_CLASS),
    }
}

//! Page titles from markup.

use scraper::{Html, Selector};

/// Title used when a page has no usable heading.
pub const UNTITLED: &str = "Untitled";

/// Text of the first `<h1>` in `html`, with nested tags removed and
/// whitespace collapsed.
///
/// Returns [`UNTITLED`] when there is no `<h1>` or it has no text.
pub fn extract_title(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    Selector::parse("h1")
        .ok()
        .and_then(|s| fragment.select(&s).next())
        .map(|h1| {
            h1.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

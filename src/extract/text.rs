//! Text helpers shared by the layout strategies

use scraper::{ElementRef, Selector};

/// Collapses every whitespace run (including non-breaking spaces) to a
/// single space and trims the ends
pub fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns all descendant text of an element, squished
pub fn element_text(element: ElementRef<'_>) -> String {
    squish(&element.text().collect::<String>())
}

/// Returns the combined text of every descendant matching `selector`
///
/// Yields an empty string when the selector does not parse or nothing
/// matches, mirroring how a missing child simply contributes no text.
pub fn child_text(element: ElementRef<'_>, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };

    let text = element
        .select(&selector)
        .flat_map(|child| child.text())
        .collect::<String>();

    squish(&text)
}

/// Drops a parenthesized qualifier and everything after it
///
/// `"#2,680 in Clothing (See Top 100 in Clothing)"` becomes
/// `"#2,680 in Clothing"`.
pub fn strip_qualifier(text: &str) -> &str {
    text.split('(').next().unwrap_or_default().trim()
}

/// Returns the trimmed text after the first `:`, if there is one
pub fn after_label(text: &str) -> Option<&str> {
    text.split_once(':').map(|(_, rest)| rest.trim())
}

/// Returns `Some(text)` for non-empty text
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

//! Entity normalization for extracted text
//!
//! Page text frequently arrives with character references that survived the
//! HTML parser, typically because the source escaped them twice
//! (`&amp;amp;`) or embedded them JSON-style (`\u0026`). This module decodes
//! them into plain display text.

use html_escape::decode_html_entities;

/// Decodes character references into clean display text
///
/// Standard named and numeric references are decoded, then the residual
/// ampersand spellings the standard decoder leaves behind are replaced with
/// a literal `&`. Decoding is repeated until the text stops changing, which
/// makes the function idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use dp_scraper::normalize;
///
/// assert_eq!(normalize("A&amp;B"), "A&B");
/// assert_eq!(normalize(r"A\u0026B"), "A&B");
/// assert_eq!(normalize("Caf&eacute;"), "Café");
/// ```
pub fn normalize(text: &str) -> String {
    // Every pass that changes the text shortens it, so this terminates
    let mut current = decode_pass(text);
    loop {
        let next = decode_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn decode_pass(text: &str) -> String {
    decode_html_entities(text)
        .replace(r"\u0026", "&")
        .replace("&amp;", "&")
}

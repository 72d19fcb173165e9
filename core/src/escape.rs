//! Display-safety escaping for free-text fields
//!
//! Merchandise names and descriptions are arbitrary user text; any
//! presentation layer rendering them into markup must pass them through
//! here first.

/// Escape the five HTML-significant characters with a fixed substitution
/// table. Everything else passes through unchanged.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

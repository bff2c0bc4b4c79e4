//! Pure display formatting: structured rich text to HTML markup and
//! publication timestamps to the fixed calendar-date form used across
//! the site.

use crate::post::Segment;
use chrono::{DateTime, FixedOffset, Locale};

/// The date pattern shown next to every post ("15 abr 2021").
const DATE_FORMAT: &str = "%d %b %Y";

/// The locale providing the abbreviated month names.
const DATE_LOCALE: Locale = Locale::pt_BR;

/// Formats a publication timestamp as a localized calendar date.
/// Deterministic: a given timestamp always renders the same string.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format_localized(DATE_FORMAT, DATE_LOCALE).to_string()
}

/// Renders a rich-text body as display markup: one paragraph element per
/// segment, with the text HTML-escaped. A structural transform only; no
/// business logic lives here.
pub fn render_rich_text(body: &[Segment]) -> String {
    let mut out = String::new();
    for segment in body {
        out.push_str("<p>");
        escape_html(&mut out, &segment.text);
        out.push_str("</p>");
    }
    out
}

/// Escapes the characters with meaning in HTML text.
fn escape_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

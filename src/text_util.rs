//! Rendering highlighted text as HTML or plain markup.

use std::borrow::Cow;

use crate::highlight::HighlightSpan;

/// How highlighted ranges are marked up when rendering.
#[derive(Debug, Clone, Copy)]
pub struct Markup {
    pub open: &'static str,
    pub close: &'static str,
    /// Applied to every literal slice before wrapping.
    pub escape: fn(&str) -> Cow<'_, str>,
}

impl Markup {
    /// `<mark>` elements with HTML-escaped text.
    pub const HTML: Self = Self {
        open: "<mark>",
        close: "</mark>",
        escape: escape_html,
    };

    /// Square brackets around matches, text emitted verbatim.
    pub const BRACKETS: Self = Self {
        open: "[",
        close: "]",
        escape: verbatim,
    };
}

/// Escape the characters that are significant in HTML text and
/// attribute values.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn verbatim(s: &str) -> Cow<'_, str> {
    Cow::Borrowed(s)
}

/// Render `text` with every span wrapped in `markup`.
///
/// Spans are character offsets as produced by
/// [`crate::highlight::highlight`]; each slice is escaped on its own and
/// only then wrapped, so escaping never splits a span. Spans past the end
/// of `text` are clamped.
///
/// # Examples
///
/// ```
/// use notelens::highlight::HighlightSpan;
/// use notelens::text_util::{Markup, render_highlighted};
///
/// let html = render_highlighted(
///     "a<b> & c",
///     &[HighlightSpan::new(1, 4)],
///     Markup::HTML,
/// );
/// assert_eq!(html, "a<mark>&lt;b&gt;</mark> &amp; c");
/// ```
pub fn render_highlighted(
    text: &str,
    spans: &[HighlightSpan],
    markup: Markup,
) -> String {
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;
    let byte_at = |offset: usize| boundaries[offset.min(char_len)];

    let mut out = String::with_capacity(text.len() + spans.len() * 16);
    let mut cursor = 0;
    for span in spans {
        let start = byte_at(span.start).max(cursor);
        let end = byte_at(span.end);
        if start >= end {
            continue;
        }
        out.push_str(&(markup.escape)(&text[cursor..start]));
        out.push_str(markup.open);
        out.push_str(&(markup.escape)(&text[start..end]));
        out.push_str(markup.close);
        cursor = end;
    }
    out.push_str(&(markup.escape)(&text[cursor..]));
    out
}

//! Parsed entry page with its flattened text.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// An HTML document plus the views the heuristics scan.
pub struct Page {
    document: Html,
    text: String,
    url: Option<Url>,
}

impl Page {
    pub fn parse(html: &str, page_url: &str) -> Self {
        let document = Html::parse_document(html);
        let text = flatten_text(document.root_element());
        Self {
            document,
            text,
            url: Url::parse(page_url).ok(),
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// All text of the page, text nodes kept apart by whitespace.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First element matching `selector`.
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Trimmed text of the first element matching `selector`, if non-empty.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .map(compact_text)
            .find(|t| !t.is_empty())
    }

    /// Resolve a possibly relative link against the page URL.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match &self.url {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Url::parse(href).ok().map(|u| u.to_string()),
        }
    }
}

/// Concatenate text nodes, inserting a space where two nodes would
/// otherwise run together. Newlines from the source are kept.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for piece in element.text() {
        if piece.is_empty() {
            continue;
        }
        let glued = matches!(
            (out.chars().last(), piece.chars().next()),
            (Some(last), Some(first)) if !last.is_whitespace() && !first.is_whitespace()
        );
        if glued {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

/// Text nodes trimmed and joined without separator.
pub fn compact_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

/// Non-empty trimmed text nodes joined by newlines.
pub fn line_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of whitespace to single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

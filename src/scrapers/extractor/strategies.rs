//! Ordered fallbacks for title and author.

use std::sync::LazyLock;

use scraper::{Node, Selector};

use super::page::{collapse_whitespace, compact_text, Page};

/// One heuristic producing a partial result.
pub type Strategy<T> = fn(&Page) -> Option<T>;

/// Run strategies in order and return the first hit.
pub fn first_match<T>(page: &Page, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(page))
}

/// Title and author as found so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameHint {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl NameHint {
    fn new(title: Option<String>, author: Option<String>) -> Option<Self> {
        let title = title.filter(|t| !t.is_empty());
        let author = author.filter(|a| !a.is_empty());
        if title.is_none() && author.is_none() {
            None
        } else {
            Some(Self { title, author })
        }
    }

    fn is_complete(&self) -> bool {
        self.title.is_some() && self.author.is_some()
    }

    /// Fill only the fields still absent.
    fn fill_from(&mut self, other: NameHint) {
        if self.title.is_none() {
            self.title = other.title;
        }
        if self.author.is_none() {
            self.author = other.author;
        }
    }
}

/// Strategies for title and author, most reliable first.
pub const NAME_STRATEGIES: &[Strategy<NameHint>] = &[
    structured_metadata,
    document_title,
    labeled_author_link,
    meta_tags,
    heading,
];

/// Apply [`NAME_STRATEGIES`] until both fields are known.
pub fn title_and_author(page: &Page) -> NameHint {
    let mut found = NameHint::default();
    for strategy in NAME_STRATEGIES {
        if found.is_complete() {
            break;
        }
        if let Some(hint) = strategy(page) {
            found.fill_from(hint);
        }
    }
    found
}

static ITEMPROP_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="articleSection"]"#).unwrap());
static ITEMPROP_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="author"]"#).unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static META_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"], meta[name="Title"], meta[name="title"]"#)
        .unwrap()
});
static META_AUTHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="Author"], meta[name="author"], meta[property="og:novel:author"]"#)
        .unwrap()
});
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

fn clean_title(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '《' || c == '》').trim().to_string()
}

/// Semantic `itemprop` markers.
fn structured_metadata(page: &Page) -> Option<NameHint> {
    NameHint::new(
        page.first_text(&ITEMPROP_TITLE).map(|t| clean_title(&t)),
        page.first_text(&ITEMPROP_AUTHOR),
    )
}

/// `<title>` of the form `title_author_site`, or `《title》author_site`.
fn document_title(page: &Page) -> Option<NameHint> {
    let raw = page.first_text(&TITLE)?;
    let parts: Vec<&str> = raw.split('_').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }

    let head = parts[0];
    if let (Some(open), Some(close)) = (head.find('《'), head.find('》')) {
        if open < close {
            let title = &head[open + '《'.len_utf8()..close];
            let rest = head[close + '》'.len_utf8()..].trim();
            if !rest.is_empty() {
                return NameHint::new(Some(clean_title(title)), Some(rest.to_string()));
            }
        }
    }
    NameHint::new(Some(clean_title(head)), Some(parts[1].to_string()))
}

/// A link whose preceding text node ends with an author label.
fn labeled_author_link(page: &Page) -> Option<NameHint> {
    page.document().select(&ANCHOR).find_map(|anchor| {
        let label = anchor.prev_sibling().and_then(|node| match node.value() {
            Node::Text(text) => Some(text.trim_end().to_string()),
            _ => None,
        })?;
        if !(label.ends_with("作者：") || label.ends_with("作者:")) {
            return None;
        }
        NameHint::new(None, Some(compact_text(anchor)))
    })
}

fn meta_content(page: &Page, selector: &Selector) -> Option<String> {
    page.document()
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
}

/// `og:title` and author meta tags.
fn meta_tags(page: &Page) -> Option<NameHint> {
    NameHint::new(
        meta_content(page, &META_TITLE).map(|t| clean_title(&t)),
        meta_content(page, &META_AUTHOR),
    )
}

/// First `<h1>`, title only.
fn heading(page: &Page) -> Option<NameHint> {
    NameHint::new(page.first_text(&H1).map(|t| clean_title(&t)), None)
}

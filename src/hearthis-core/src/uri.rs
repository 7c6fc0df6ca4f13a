//! Synthetic URI scheme for the hearthis browse tree.
//!
//! Every URI starts with `hearthis:` followed by a node kind and optional
//! `:<id>` / `:<page>` segments. Paged category listings use the `_p` infix
//! (`hearthis:categories:_p:<id>:<page>`).

pub const SCHEME: &str = "hearthis";
pub const ROOT_URI: &str = "hearthis:root";
pub const FEED_URI: &str = "hearthis:feed";
pub const NEWS_URI: &str = "hearthis:news";
pub const CATEGORIES_URI: &str = "hearthis:categories";

const PAGED_CATEGORY_INFIX: &str = "_p";

pub fn artist_uri(user_id: u64) -> String {
    format!("{SCHEME}:artist:{user_id}")
}

pub fn track_uri(track_id: u64) -> String {
    format!("{SCHEME}:track:{track_id}")
}

pub fn category_uri(category_id: &str) -> String {
    format!("{CATEGORIES_URI}:{category_id}")
}

/// Prefix the page entries of a category listing link to.
pub fn category_page_prefix(category_id: &str) -> String {
    format!("{CATEGORIES_URI}:{PAGED_CATEGORY_INFIX}:{category_id}")
}

pub fn search_uri(query: &str) -> String {
    format!("{SCHEME}:search:{query}")
}

/// Two-digit page label for single-digit pages (`3` -> `03`).
pub fn pad_page(page: u32) -> String {
    format!("{page:02}")
}

/// A parsed synthetic URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryUri {
    Root,
    Feed { page: Option<u32> },
    News { page: Option<u32> },
    Categories,
    Category { id: String, page: Option<u32> },
    Track { id: u64 },
    Artist { id: u64 },
}

impl LibraryUri {
    /// Parses a `hearthis:` URI. Returns `None` for anything outside the grammar.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME)?.strip_prefix(':')?;
        let mut parts = rest.split(':');
        let head = parts.next()?;
        let segments: Vec<&str> = parts.collect();

        let parsed = match (head, segments.as_slice()) {
            ("root", []) => LibraryUri::Root,
            ("feed", []) => LibraryUri::Feed { page: None },
            ("feed", [page]) => LibraryUri::Feed {
                page: Some(parse_page(page)?),
            },
            ("news", []) => LibraryUri::News { page: None },
            ("news", [page]) => LibraryUri::News {
                page: Some(parse_page(page)?),
            },
            ("categories", []) => LibraryUri::Categories,
            ("categories", [PAGED_CATEGORY_INFIX, id]) => LibraryUri::Category {
                id: parse_category_id(id)?,
                page: None,
            },
            ("categories", [PAGED_CATEGORY_INFIX, id, page]) => LibraryUri::Category {
                id: parse_category_id(id)?,
                page: Some(parse_page(page)?),
            },
            ("categories", [id]) => LibraryUri::Category {
                id: parse_category_id(id)?,
                page: None,
            },
            ("categories", [id, page]) => LibraryUri::Category {
                id: parse_category_id(id)?,
                page: Some(parse_page(page)?),
            },
            ("track", [id]) => LibraryUri::Track { id: id.parse().ok()? },
            ("artist", [id]) => LibraryUri::Artist { id: id.parse().ok()? },
            _ => return None,
        };
        Some(parsed)
    }
}

/// Pages are 1-based; anything below is clamped to the first page. The last
/// `u32` is rejected since it has no next page.
fn parse_page(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .filter(|page| *page < u32::MAX)
        .map(|page| page.max(1))
}

fn parse_category_id(raw: &str) -> Option<String> {
    if raw.is_empty() || raw == PAGED_CATEGORY_INFIX {
        return None;
    }
    Some(raw.to_string())
}

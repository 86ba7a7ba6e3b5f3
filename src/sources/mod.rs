// src/sources/mod.rs
pub mod eleduck;
pub mod github;
pub mod v2ex;

use anyhow::Result;

/// One entry produced by a source listing. Ephemeral: nothing survives a
/// cycle except the identifier recorded in the seen set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Source-unique identifier, stable across polls.
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    /// Inline body the listing already carries, if any. Used as the
    /// default enrichment when a source performs no extra fetch.
    pub summary: Option<String>,
}

/// Capability set of one content source. The engine is written once
/// against this trait; each source only describes how to list items and
/// (optionally) how to fetch an enriched body for one of them.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    /// Keywords matched against item titles (substring, OR semantics).
    fn keywords(&self) -> &[String];

    /// Capacity bound of this source's seen set.
    fn max_retained(&self) -> usize;

    /// Fetch the current listing. May page through several sub-requests
    /// and concatenate. Order is source-defined, typically newest first.
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Fetch an enriched body for one matched item. The default uses the
    /// item's own summary; sources that need an extra round-trip override.
    async fn fetch_body(&self, item: &Item) -> Result<Option<String>> {
        Ok(item.summary.clone())
    }
}

/// Normalize text scraped from feeds/HTML: decode entities, strip tags,
/// collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_collapses_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp;<b>world</b></p>\n\n  ";
        assert_eq!(normalize_text(s), "Hello, world");
    }

    #[test]
    fn normalize_text_caps_length() {
        let s = "x".repeat(5000);
        assert_eq!(normalize_text(&s).chars().count(), 1500);
    }
}

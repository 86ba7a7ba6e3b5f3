use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::fmt;

use crate::sources::{normalize_text, Item, Source};

const API_URL: &str = "https://svc.eleduck.com";
const SITE_URL: &str = "https://eleduck.com";
const PAGES: u32 = 4;

#[derive(Debug, Deserialize)]
struct PostsPage {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: PostId,
    title: Option<String>,
    full_title: Option<String>,
}

/// Post ids arrive as numbers in some payloads and strings in others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PostId {
    Num(i64),
    Str(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Num(n) => write!(f, "{n}"),
            PostId::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Paginated JSON job board. Listing pages 1..=N are concatenated;
/// enrichment fetches the post page and extracts the content region.
pub struct EleduckSource {
    client: reqwest::Client,
    api_url: String,
    site_url: String,
    keywords: Vec<String>,
    max_retained: usize,
}

impl EleduckSource {
    pub fn new(client: reqwest::Client, keywords: Vec<String>) -> Self {
        Self {
            client,
            api_url: API_URL.to_string(),
            site_url: SITE_URL.to_string(),
            keywords,
            max_retained: 200,
        }
    }

    pub fn with_base_urls(mut self, api_url: impl Into<String>, site_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.site_url = site_url.into();
        self
    }

    fn post_link(&self, id: &str) -> String {
        format!("{}/posts/{}", self.site_url, id)
    }

    /// Parse one listing page. Separated from HTTP so fixtures can
    /// drive tests.
    pub fn items_from_page(&self, json: &str) -> Result<Vec<Item>> {
        let page: PostsPage = serde_json::from_str(json).context("parsing eleduck posts json")?;
        Ok(page
            .posts
            .into_iter()
            .map(|p| {
                let id = p.id.to_string();
                let link = self.post_link(&id);
                Item {
                    id,
                    title: p.full_title.or(p.title).unwrap_or_default(),
                    link: Some(link),
                    summary: None,
                }
            })
            .collect())
    }
}

/// Extract the post body text from a detail page.
pub fn extract_post_body(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".post-contents .rich-content")
        .map_err(|e| anyhow!("selector: {e}"))?;

    let text = document
        .select(&selector)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(normalize_text(&text))
}

#[async_trait]
impl Source for EleduckSource {
    fn name(&self) -> &str {
        "Eleduck"
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn max_retained(&self) -> usize {
        self.max_retained
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let mut out = Vec::new();
        for page in 1..=PAGES {
            let url = format!(
                "{}/api/v1/posts?sort=-published_at&page={}",
                self.api_url, page
            );
            let body = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("eleduck page {page} get"))?
                .text()
                .await
                .with_context(|| format!("eleduck page {page} body"))?;
            out.extend(self.items_from_page(&body)?);
        }
        Ok(out)
    }

    async fn fetch_body(&self, item: &Item) -> Result<Option<String>> {
        let url = self.post_link(&item.id);
        let html = self
            .client
            .get(&url)
            .send()
            .await
            .context("eleduck post get")?
            .text()
            .await
            .context("eleduck post body")?;
        let text = extract_post_body(&html)?;
        Ok((!text.is_empty()).then_some(text))
    }
}

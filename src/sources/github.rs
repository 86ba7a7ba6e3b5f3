use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::{normalize_text, Item, Source};

const API_URL: &str = "https://api.github.com";
const REPO: &str = "rebase-network/who-is-hiring";

#[derive(Debug, Deserialize)]
struct Issue {
    id: u64,
    title: String,
    html_url: Option<String>,
    body: Option<String>,
}

/// Parse one issues listing. Separated from HTTP so fixtures can drive
/// tests.
pub fn items_from_issues(json: &str) -> Result<Vec<Item>> {
    let issues: Vec<Issue> = serde_json::from_str(json).context("parsing github issues json")?;
    Ok(issues
        .into_iter()
        .map(|i| Item {
            id: i.id.to_string(),
            title: i.title,
            link: i.html_url,
            summary: i
                .body
                .map(|b| normalize_text(&b))
                .filter(|b| !b.is_empty()),
        })
        .collect())
}

/// Open issues of one repository, via the REST listing. The issue body
/// is the summary; no extra enrichment round-trip.
pub struct GithubIssuesSource {
    client: reqwest::Client,
    api_url: String,
    repo: String,
    keywords: Vec<String>,
    max_retained: usize,
}

impl GithubIssuesSource {
    pub fn new(client: reqwest::Client, keywords: Vec<String>) -> Self {
        Self {
            client,
            api_url: API_URL.to_string(),
            repo: REPO.to_string(),
            keywords,
            max_retained: 300,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }
}

#[async_trait]
impl Source for GithubIssuesSource {
    fn name(&self) -> &str {
        "GitHub Issues"
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn max_retained(&self) -> usize {
        self.max_retained
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let url = format!("{}/repos/{}/issues?state=open", self.api_url, self.repo);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("github issues get")?
            .text()
            .await
            .context("github issues body")?;
        items_from_issues(&body)
    }
}

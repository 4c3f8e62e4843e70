//! Wikipedia corpus collection.
//!
//! Fetches plain-text article extracts from the MediaWiki API and writes
//! them under `<data_dir>/raw/`, one file per article, with a small
//! metadata header that [`crate::ingest`] strips on the way back in.
//! A failed article is recorded in the run statistics and never aborts
//! the batch.

use crate::config::CollectionConfig;
use crate::error::CollectError;
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info};

/// A fetched article.
#[derive(Debug, Clone)]
pub struct WikipediaPage {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Per-run collection statistics.
#[derive(Debug, Clone, Default)]
pub struct CollectStats {
    pub collected: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Collects and saves Wikipedia articles.
pub struct WikipediaCollector {
    client: reqwest::Client,
    api_url: String,
    raw_dir: PathBuf,
}

impl WikipediaCollector {
    pub fn new(config: &CollectionConfig) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CollectError::Http {
                message: e.to_string(),
            })?;
        let raw_dir = config.data_dir.join("raw");
        std::fs::create_dir_all(&raw_dir)?;
        Ok(Self {
            client,
            api_url: format!("https://{}.wikipedia.org/w/api.php", config.language),
            raw_dir,
        })
    }

    /// Fetch up to `max_articles` of `titles` and save each under `raw/`.
    pub async fn collect_articles(&self, titles: &[&str], max_articles: usize) -> CollectStats {
        let mut stats = CollectStats::default();

        for title in titles.iter().take(max_articles) {
            info!(title, "collecting article");
            match self.collect_one(title).await {
                Ok(path) => {
                    info!(title, path = %path.display(), "saved article");
                    stats.collected += 1;
                }
                Err(e) => {
                    error!(title, error = %e, "failed to collect article");
                    stats.failed += 1;
                    stats.errors.push(format!("{title}: {e}"));
                }
            }
        }

        stats
    }

    async fn collect_one(&self, title: &str) -> Result<PathBuf, CollectError> {
        let page = self.fetch_extract(title).await?;
        let path = self.raw_dir.join(format!("{}.txt", clean_filename(&page.title)));
        let content = format!(
            "Source: {}\nURL: {}\nFetched: {}\n\n{}",
            page.title,
            page.url,
            Utc::now().to_rfc3339(),
            page.text
        );
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Fetch one article's plain-text extract.
    pub async fn fetch_extract(&self, title: &str) -> Result<WikipediaPage, CollectError> {
        let url = format!(
            "{}?action=query&prop=extracts|info&inprop=url&explaintext=1&redirects=1\
             &format=json&formatversion=2&titles={}",
            self.api_url,
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollectError::Http {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Http {
                message: format!("HTTP {status} from MediaWiki API"),
            });
        }

        let body: Value = response.json().await.map_err(|e| CollectError::ResponseParse {
            message: e.to_string(),
        })?;
        Self::parse_page(&body, title)
    }

    fn parse_page(body: &Value, requested_title: &str) -> Result<WikipediaPage, CollectError> {
        let page = body
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|p| p.get(0))
            .ok_or_else(|| CollectError::ResponseParse {
                message: "No pages in response".to_string(),
            })?;

        if page.get("missing").is_some_and(|m| m.as_bool() == Some(true)) {
            return Err(CollectError::PageNotFound {
                title: requested_title.to_string(),
            });
        }

        let title = page
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or(requested_title)
            .to_string();
        let text = page
            .get("extract")
            .and_then(|e| e.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(CollectError::PageNotFound {
                title: requested_title.to_string(),
            });
        }
        let url = page
            .get("fullurl")
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(WikipediaPage { title, text, url })
    }
}

/// Normalize an article title into a safe file name: lowercase, alphanumeric
/// runs joined by single underscores, everything else dropped.
pub fn clean_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
    }
    out
}

//! Job posting fetcher: one URL to visible page text.
//!
//! Caching is disabled on every request. A page whose visible text is shorter
//! than 200 characters is reported as not ready (typically a JS shell that has
//! not rendered its content).

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{redirect::Policy, Client, Url};
use scraper::{Html, Node, Selector};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

pub const MIN_READY_TEXT_CHARS: usize = 200;

const USER_AGENT: &str = concat!("tailor-api/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_REDIRECTS: usize = 8;
const NON_VISIBLE: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("page content not ready ({chars} visible characters)")]
    NotReady { chars: usize },
}

/// Per-URL result. `text` is empty when `success` is false.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub url: String,
    pub success: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct JobPageFetcher {
    http: Client,
}

impl JobPageFetcher {
    pub fn new() -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, url_raw: &str) -> Result<String, ScrapeError> {
        let url = Url::parse(url_raw.trim()).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        ready_text(&html)
    }

    /// Like `fetch`, but folds the error into the outcome.
    pub async fn fetch_outcome(&self, url: &str) -> ScrapeOutcome {
        match self.fetch(url).await {
            Ok(text) => {
                info!("Fetched {} chars from {url}", text.chars().count());
                ScrapeOutcome {
                    url: url.to_string(),
                    success: true,
                    text,
                    error: None,
                }
            }
            Err(e) => {
                error!("Crawl error for {url}: {e}");
                ScrapeOutcome {
                    url: url.to_string(),
                    success: false,
                    text: String::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn ready_text(html: &str) -> Result<String, ScrapeError> {
    let text = visible_text(html);
    let chars = text.chars().count();
    if chars < MIN_READY_TEXT_CHARS {
        return Err(ScrapeError::NotReady { chars });
    }
    Ok(text)
}

/// Non-empty text runs under `<body>`, one per line, skipping script-like elements.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(body) = Selector::parse("body") else {
        return String::new();
    };

    let mut lines = Vec::new();
    for root in document.select(&body) {
        for node in root.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| NON_VISIBLE.contains(&e.name()))
            });
            let trimmed = text.trim();
            if !hidden && !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
    }
    lines.join("\n")
}

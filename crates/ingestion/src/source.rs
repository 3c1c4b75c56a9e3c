//! Upstream article sources

use crate::errors::{IngestionError, Result};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use paperhub_common::db::{
    models::{PaperSource, PaperStatus},
    NewPaper,
};
use std::time::Duration;

/// An article as fetched from an upstream index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedArticle {
    pub external_id: String,
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    pub publication_year: Option<i32>,
}

impl ImportedArticle {
    /// Enough to store: an identifier and a title
    pub fn is_importable(&self) -> bool {
        !self.external_id.trim().is_empty() && !self.title.trim().is_empty()
    }

    /// A published, ownerless paper; the abstract doubles as the body
    pub fn into_new_paper(self, source: PaperSource) -> NewPaper {
        NewPaper {
            owner_id: None,
            title: self.title,
            content: self.abstract_text.clone(),
            abstract_text: self.abstract_text,
            authors: self.authors,
            author_ids: Vec::new(),
            keywords: self.keywords,
            status: PaperStatus::Published,
            source,
            external_id: Some(self.external_id),
            doi: self.doi,
            journal: self.journal,
            volume: self.volume,
            issue: self.issue,
            pages: self.pages,
            url: self.url,
            publication_year: self.publication_year,
        }
    }
}

/// Trait for article search backends
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Which `papers.source` value imported rows get
    fn source(&self) -> PaperSource;

    /// Search and return up to `max` articles
    async fn search(&self, query: &str, max: usize) -> Result<Vec<ImportedArticle>>;
}

/// Shared HTTP client with the configured timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("paperhub-ingest/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| IngestionError::ConfigError(format!("HTTP client: {}", e)))
}

async fn get_once(
    http: &reqwest::Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> Result<String> {
    let http_err = |source| IngestionError::Http {
        url: url.to_string(),
        source,
    };

    let response = http.get(url).query(query).send().await.map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IngestionError::Upstream {
            service,
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }

    response.text().await.map_err(http_err)
}

/// GET with exponential backoff on transient failures
pub(crate) async fn get_with_retry(
    http: &reqwest::Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
    budget: Duration,
) -> Result<String> {
    let policy = ExponentialBackoff {
        max_elapsed_time: Some(budget),
        ..Default::default()
    };

    retry(policy, || async move {
        get_once(http, service, url, query).await.map_err(|e| {
            if e.is_transient() {
                tracing::warn!(service, error = %e, "Request failed, retrying");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .await
}

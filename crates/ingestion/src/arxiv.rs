//! arXiv Atom API client

use crate::errors::{IngestionError, Result};
use crate::source::{get_with_retry, http_client, ArticleSource, ImportedArticle};
use crate::xml;
use async_trait::async_trait;
use paperhub_common::{config::ImporterConfig, db::models::PaperSource};
use std::time::Duration;

/// arXiv refuses result windows larger than this per request
const MAX_RESULTS_PER_REQUEST: usize = 2000;

pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
    retry_budget: Duration,
}

impl ArxivClient {
    pub fn new(config: &ImporterConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.arxiv_base_url.clone(),
            retry_budget: Duration::from_secs(config.max_retry_secs),
        })
    }
}

/// Bare queries search all fields; fielded ones (`au:`, `ti:`, ...) pass through
fn search_query(query: &str) -> String {
    let query = query.trim();
    if query.contains(':') {
        query.to_string()
    } else {
        format!("all:{}", query)
    }
}

#[async_trait]
impl ArticleSource for ArxivClient {
    fn source(&self) -> PaperSource {
        PaperSource::Arxiv
    }

    async fn search(&self, query: &str, max: usize) -> Result<Vec<ImportedArticle>> {
        let max = max.clamp(1, MAX_RESULTS_PER_REQUEST);
        let params = [
            ("search_query", search_query(query)),
            ("start", "0".to_string()),
            ("max_results", max.to_string()),
        ];

        tracing::info!(query, max, "Querying arXiv");

        let feed = get_with_retry(&self.http, "arxiv", &self.base_url, &params, self.retry_budget).await?;
        let mut articles = parse_feed(&feed)?;
        articles.truncate(max);
        Ok(articles)
    }
}

/// `http://arxiv.org/abs/1706.03762v5` → `1706.03762`
fn arxiv_id(raw: &str) -> String {
    let id = raw
        .trim()
        .rsplit_once("/abs/")
        .map_or(raw.trim(), |(_, id)| id);

    match id.rsplit_once('v') {
        Some((base, version))
            if !base.is_empty()
                && !version.is_empty()
                && version.chars().all(|c| c.is_ascii_digit()) =>
        {
            base.to_string()
        }
        _ => id.to_string(),
    }
}

fn parse_entry(entry: &str) -> Option<ImportedArticle> {
    let raw_id = xml::element_text(entry, "id")?;
    let external_id = arxiv_id(&raw_id);

    let authors = xml::elements(entry, "author")
        .into_iter()
        .filter_map(|author| xml::element_text(author, "name"))
        .collect();

    let publication_year = xml::element_text(entry, "published")
        .and_then(|date| date.get(..4).and_then(|y| y.parse().ok()));

    Some(ImportedArticle {
        url: Some(format!("https://arxiv.org/abs/{}", external_id)),
        external_id,
        title: xml::element_text(entry, "title").unwrap_or_default(),
        abstract_text: xml::element_text(entry, "summary").unwrap_or_default(),
        authors,
        keywords: xml::attribute_values(entry, "category", "term"),
        doi: xml::element_text(entry, "arxiv:doi"),
        journal: xml::element_text(entry, "arxiv:journal_ref"),
        volume: None,
        issue: None,
        pages: None,
        publication_year,
    })
}

/// Parse an Atom feed from the arXiv query API
pub fn parse_feed(feed: &str) -> Result<Vec<ImportedArticle>> {
    let entries = xml::elements(feed, "entry");

    // Query errors come back as a single entry with an errors id
    if let Some(first) = entries.first() {
        if xml::element_text(first, "id").is_some_and(|id| id.contains("/api/errors")) {
            return Err(IngestionError::Parse {
                what: "arXiv feed",
                message: xml::element_text(first, "summary")
                    .unwrap_or_else(|| "query rejected".to_string()),
            });
        }
    }

    Ok(entries.into_iter().filter_map(parse_entry).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on
complex recurrent &amp; convolutional networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <arxiv:doi xmlns:arxiv="http://arxiv.org/schemas/atom">10.48550/arXiv.1706.03762</arxiv:doi>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.CL"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/hep-th/9901001v1</id>
    <published>1999-01-01T00:00:00Z</published>
    <title>Old style identifier</title>
    <summary>Short.</summary>
    <author><name>Someone Else</name></author>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries() {
        let articles = parse_feed(FEED).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.external_id, "1706.03762");
        assert_eq!(first.title, "Attention Is All You Need");
        assert_eq!(
            first.abstract_text,
            "The dominant sequence transduction models are based on complex recurrent & convolutional networks."
        );
        assert_eq!(first.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(first.publication_year, Some(2017));
        assert_eq!(first.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
        assert_eq!(first.keywords, vec!["cs.CL", "cs.LG"]);
        assert_eq!(first.url.as_deref(), Some("https://arxiv.org/abs/1706.03762"));

        assert_eq!(articles[1].external_id, "hep-th/9901001");
        assert_eq!(articles[1].doi, None);
    }

    #[test]
    fn error_feed_is_an_error() {
        let feed = r#"<feed><entry><id>http://arxiv.org/api/errors#incorrect_id_format</id>
            <title>Error</title><summary>incorrect id format</summary></entry></feed>"#;
        assert!(matches!(parse_feed(feed), Err(IngestionError::Parse { .. })));
    }

    #[test]
    fn empty_feed_is_empty() {
        assert!(parse_feed("<feed></feed>").unwrap().is_empty());
    }

    #[test]
    fn version_suffix_is_dropped() {
        assert_eq!(arxiv_id("http://arxiv.org/abs/2101.00001v12"), "2101.00001");
        assert_eq!(arxiv_id("2101.00001"), "2101.00001");
        assert_eq!(arxiv_id("http://arxiv.org/abs/solv-int/9901001"), "solv-int/9901001");
    }

    #[test]
    fn bare_queries_search_all_fields() {
        assert_eq!(search_query(" transformers "), "all:transformers");
        assert_eq!(search_query("au:turing"), "au:turing");
    }
}

//! PubMed E-utilities client (esearch + efetch)

use crate::errors::{IngestionError, Result};
use crate::source::{get_with_retry, http_client, ArticleSource, ImportedArticle};
use crate::xml;
use async_trait::async_trait;
use paperhub_common::{config::ImporterConfig, db::models::PaperSource};
use serde::Deserialize;
use std::time::Duration;

/// esearch caps `retmax` here
const MAX_RESULTS_PER_REQUEST: usize = 10_000;

pub struct PubmedClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry_budget: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubmedClient {
    pub fn new(config: &ImporterConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.pubmed_base_url.trim_end_matches('/').to_string(),
            api_key: config.pubmed_api_key.clone().filter(|k| !k.trim().is_empty()),
            retry_budget: Duration::from_secs(config.max_retry_secs),
        })
    }

    fn params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.insert(0, ("db", "pubmed".to_string()));
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn search_ids(&self, query: &str, max: usize) -> Result<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let params = self.params(vec![
            ("term", query.trim().to_string()),
            ("retmax", max.to_string()),
            ("retmode", "json".to_string()),
        ]);

        let body = get_with_retry(&self.http, "pubmed", &url, &params, self.retry_budget).await?;
        parse_search(&body)
    }

    async fn fetch(&self, ids: &[String]) -> Result<String> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let params = self.params(vec![
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ]);

        get_with_retry(&self.http, "pubmed", &url, &params, self.retry_budget).await
    }
}

#[async_trait]
impl ArticleSource for PubmedClient {
    fn source(&self) -> PaperSource {
        PaperSource::Pubmed
    }

    async fn search(&self, query: &str, max: usize) -> Result<Vec<ImportedArticle>> {
        let max = max.clamp(1, MAX_RESULTS_PER_REQUEST);

        tracing::info!(query, max, "Querying PubMed");

        let ids = self.search_ids(query, max).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = ids.len(), "Fetching PubMed records");

        let records = self.fetch(&ids).await?;
        let mut articles = parse_efetch(&records);
        articles.truncate(max);
        Ok(articles)
    }
}

/// PMIDs from an esearch JSON response
pub fn parse_search(body: &str) -> Result<Vec<String>> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| IngestionError::Parse {
            what: "PubMed search response",
            message: e.to_string(),
        })?;
    Ok(response.esearchresult.idlist)
}

fn abstract_text(article: &str) -> String {
    let Some(block) = xml::element(article, "Abstract") else {
        return String::new();
    };

    xml::elements_with_attrs(block, "AbstractText")
        .into_iter()
        .filter_map(|(attrs, body)| {
            let text = xml::text(body);
            if text.is_empty() {
                return None;
            }
            Some(match xml::attr(attrs, "Label") {
                Some(label) => format!("{}: {}", label, text),
                None => text,
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn author_names(article: &str) -> Vec<String> {
    let Some(list) = xml::element(article, "AuthorList") else {
        return Vec::new();
    };

    xml::elements(list, "Author")
        .into_iter()
        .filter_map(|author| {
            if let Some(collective) = xml::element_text(author, "CollectiveName") {
                return Some(collective);
            }
            let last = xml::element_text(author, "LastName")?;
            Some(match xml::element_text(author, "ForeName") {
                Some(fore) => format!("{} {}", fore, last),
                None => last,
            })
        })
        .collect()
}

fn publication_year(article: &str) -> Option<i32> {
    let date = xml::element(article, "PubDate")?;
    xml::element_text(date, "Year")
        .or_else(|| xml::element_text(date, "MedlineDate"))
        .and_then(|d| d.get(..4).and_then(|y| y.parse().ok()))
}

fn doi(record: &str, article: &str) -> Option<String> {
    xml::elements_with_attrs(record, "ArticleId")
        .into_iter()
        .find(|(attrs, _)| xml::attr(attrs, "IdType").as_deref() == Some("doi"))
        .map(|(_, body)| xml::text(body))
        .or_else(|| {
            xml::elements_with_attrs(article, "ELocationID")
                .into_iter()
                .find(|(attrs, _)| xml::attr(attrs, "EIdType").as_deref() == Some("doi"))
                .map(|(_, body)| xml::text(body))
        })
        .filter(|d| !d.is_empty())
}

fn parse_record(record: &str) -> Option<ImportedArticle> {
    let pmid = xml::element_text(record, "PMID")?;
    let article = xml::element(record, "Article")?;
    let journal = xml::element(article, "Journal");

    Some(ImportedArticle {
        url: Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid)),
        title: xml::element_text(article, "ArticleTitle").unwrap_or_default(),
        abstract_text: abstract_text(article),
        authors: author_names(article),
        keywords: xml::elements(record, "Keyword")
            .into_iter()
            .map(xml::text)
            .filter(|k| !k.is_empty())
            .collect(),
        doi: doi(record, article),
        journal: journal.and_then(|j| xml::element_text(j, "Title")),
        volume: journal.and_then(|j| xml::element_text(j, "Volume")),
        issue: journal.and_then(|j| xml::element_text(j, "Issue")),
        pages: xml::element_text(article, "MedlinePgn"),
        publication_year: journal.and_then(publication_year),
        external_id: pmid,
    })
}

/// Articles from an efetch `PubmedArticleSet` document
pub fn parse_efetch(records: &str) -> Vec<ImportedArticle> {
    xml::elements(records, "PubmedArticle")
        .into_iter()
        .filter_map(parse_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EFETCH: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
<PubmedArticle>
  <MedlineCitation Status="MEDLINE" Owner="NLM">
    <PMID Version="1">31234567</PMID>
    <Article PubModel="Print">
      <Journal>
        <JournalIssue CitedMedium="Internet">
          <Volume>12</Volume>
          <Issue>3</Issue>
          <PubDate><Year>2019</Year><Month>Mar</Month></PubDate>
        </JournalIssue>
        <Title>Nature communications</Title>
      </Journal>
      <ArticleTitle>CRISPR screens in <i>human</i> cells.</ArticleTitle>
      <Pagination><MedlinePgn>101-110</MedlinePgn></Pagination>
      <ELocationID EIdType="pii">S0001</ELocationID>
      <Abstract>
        <AbstractText Label="BACKGROUND">Genome editing &amp; screening.</AbstractText>
        <AbstractText Label="RESULTS">It works.</AbstractText>
      </Abstract>
      <AuthorList CompleteYN="Y">
        <Author ValidYN="Y"><LastName>Doudna</LastName><ForeName>Jennifer A</ForeName></Author>
        <Author ValidYN="Y"><CollectiveName>CRISPR Consortium</CollectiveName></Author>
        <Author ValidYN="Y"><LastName>Zhang</LastName></Author>
      </AuthorList>
    </Article>
    <KeywordList Owner="NOTNLM">
      <Keyword MajorTopicYN="N">CRISPR</Keyword>
      <Keyword MajorTopicYN="N">screens</Keyword>
    </KeywordList>
  </MedlineCitation>
  <PubmedData>
    <ArticleIdList>
      <ArticleId IdType="pubmed">31234567</ArticleId>
      <ArticleId IdType="doi">10.1038/s41467-019-0001-x</ArticleId>
    </ArticleIdList>
  </PubmedData>
</PubmedArticle>
<PubmedArticle>
  <MedlineCitation>
    <PMID Version="1">30000001</PMID>
    <Article>
      <Journal>
        <JournalIssue><PubDate><MedlineDate>1998 Dec-1999 Jan</MedlineDate></PubDate></JournalIssue>
        <Title>Old Journal</Title>
      </Journal>
      <ArticleTitle>No abstract here</ArticleTitle>
      <ELocationID EIdType="doi" ValidYN="Y">10.1000/old.1</ELocationID>
    </Article>
  </MedlineCitation>
</PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn parses_structured_record() {
        let articles = parse_efetch(EFETCH);
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.external_id, "31234567");
        assert_eq!(first.title, "CRISPR screens in human cells.");
        assert_eq!(
            first.abstract_text,
            "BACKGROUND: Genome editing & screening. RESULTS: It works."
        );
        assert_eq!(
            first.authors,
            vec!["Jennifer A Doudna", "CRISPR Consortium", "Zhang"]
        );
        assert_eq!(first.journal.as_deref(), Some("Nature communications"));
        assert_eq!(first.volume.as_deref(), Some("12"));
        assert_eq!(first.issue.as_deref(), Some("3"));
        assert_eq!(first.pages.as_deref(), Some("101-110"));
        assert_eq!(first.publication_year, Some(2019));
        assert_eq!(first.doi.as_deref(), Some("10.1038/s41467-019-0001-x"));
        assert_eq!(first.keywords, vec!["CRISPR", "screens"]);
        assert_eq!(
            first.url.as_deref(),
            Some("https://pubmed.ncbi.nlm.nih.gov/31234567/")
        );
    }

    #[test]
    fn falls_back_to_medline_date_and_elocation_doi() {
        let articles = parse_efetch(EFETCH);
        let second = &articles[1];
        assert_eq!(second.publication_year, Some(1998));
        assert_eq!(second.doi.as_deref(), Some("10.1000/old.1"));
        assert!(second.abstract_text.is_empty());
        assert!(second.authors.is_empty());
        assert_eq!(second.volume, None);
    }

    #[test]
    fn parses_search_ids() {
        let body = r#"{"header":{"type":"esearch","version":"0.3"},
            "esearchresult":{"count":"2","retmax":"2","retstart":"0","idlist":["111","222"]}}"#;
        assert_eq!(parse_search(body).unwrap(), vec!["111", "222"]);
    }

    #[test]
    fn malformed_search_is_a_parse_error() {
        assert!(matches!(
            parse_search("<html>busy</html>"),
            Err(IngestionError::Parse { .. })
        ));
    }
}

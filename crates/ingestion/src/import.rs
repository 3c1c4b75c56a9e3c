//! Article import: fetch from a source, skip what we already have, insert the rest

use crate::errors::Result;
use crate::source::ArticleSource;
use paperhub_common::{metrics, Repository};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Outcome of one import run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// Fetch up to `max` articles for `query` and store the new ones.
///
/// Duplicates are detected both within the fetched batch and against
/// existing rows with the same (`source`, `external_id`). With `dry_run`
/// nothing is written.
pub async fn import_articles(
    repo: &Repository,
    source: &dyn ArticleSource,
    query: &str,
    max: usize,
    dry_run: bool,
) -> Result<ImportReport> {
    let paper_source = source.source();
    let articles = source.search(query, max).await?;

    let mut report = ImportReport {
        fetched: articles.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for article in articles {
        if !article.is_importable() {
            warn!(external_id = %article.external_id, "Skipping article without id or title");
            report.invalid += 1;
            continue;
        }

        if !seen.insert(article.external_id.clone()) {
            report.duplicates += 1;
            continue;
        }

        if repo
            .find_paper_by_external_id(paper_source, &article.external_id)
            .await?
            .is_some()
        {
            debug!(external_id = %article.external_id, "Already imported");
            report.duplicates += 1;
            continue;
        }

        if dry_run {
            info!(external_id = %article.external_id, title = %article.title, "Would import");
        } else {
            let paper = repo.create_paper(article.into_new_paper(paper_source)).await?;
            debug!(paper_id = %paper.id, "Imported");
        }
        report.inserted += 1;
    }

    if !dry_run {
        metrics::record_articles_imported(paper_source.as_str(), report.inserted as u64);
    }

    info!(
        source = paper_source.as_str(),
        fetched = report.fetched,
        inserted = report.inserted,
        duplicates = report.duplicates,
        invalid = report.invalid,
        dry_run,
        "Import finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ImportedArticle;
    use async_trait::async_trait;
    use paperhub_common::db::models::{Paper, PaperSource};
    use paperhub_common::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase};

    struct FixedSource(Vec<ImportedArticle>);

    #[async_trait]
    impl ArticleSource for FixedSource {
        fn source(&self) -> PaperSource {
            PaperSource::Arxiv
        }

        async fn search(&self, _query: &str, max: usize) -> Result<Vec<ImportedArticle>> {
            Ok(self.0.iter().take(max).cloned().collect())
        }
    }

    fn article(id: &str, title: &str) -> ImportedArticle {
        ImportedArticle {
            external_id: id.to_string(),
            title: title.to_string(),
            abstract_text: "Abstract.".to_string(),
            authors: vec!["Alan Turing".to_string()],
            ..Default::default()
        }
    }

    fn stored(external_id: &str) -> Paper {
        let now = chrono::Utc::now();
        Paper {
            id: uuid::Uuid::new_v4(),
            owner_id: None,
            title: "Stored".into(),
            abstract_text: "Abstract.".into(),
            content: "Abstract.".into(),
            authors: serde_json::json!(["Alan Turing"]),
            author_ids: serde_json::json!([]),
            keywords: serde_json::json!([]),
            status: "published".into(),
            source: "arxiv".into(),
            external_id: Some(external_id.into()),
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: Some(1936),
            research_story: None,
            view_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: Some(now.into()),
        }
    }

    #[tokio::test]
    async fn dry_run_counts_without_writing() {
        // Lookups only: "a" is new, "b" already exists
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Paper>::new(), vec![stored("b")]])
            .into_connection();
        let repo = Repository::new(DbPool::from_connection(db));

        let source = FixedSource(vec![
            article("a", "New paper"),
            article("a", "Same id twice"),
            article("b", "Existing paper"),
            article("", "No id"),
            article("c", "   "),
        ]);

        let report = import_articles(&repo, &source, "turing", 10, true).await.unwrap();
        assert_eq!(
            report,
            ImportReport {
                fetched: 5,
                inserted: 1,
                duplicates: 2,
                invalid: 2,
            }
        );
    }

    #[tokio::test]
    async fn inserts_new_articles() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Paper>::new()])
            .append_query_results([vec![stored("a")]])
            .into_connection();
        let repo = Repository::new(DbPool::from_connection(db));

        let source = FixedSource(vec![article("a", "New paper")]);
        let report = import_articles(&repo, &source, "turing", 10, false).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.duplicates, 0);
    }

    #[tokio::test]
    async fn respects_max() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Paper>::new()])
            .into_connection();
        let repo = Repository::new(DbPool::from_connection(db));

        let source = FixedSource(vec![article("a", "One"), article("b", "Two")]);
        let report = import_articles(&repo, &source, "q", 1, true).await.unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(report.inserted, 1);
    }
}

//! Paper management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{authored_paper, required_text, visible_paper};
use crate::AppState;
use paperhub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::{
        models::{Paper, PaperSource, ResearchStory},
        NewPaper, PaperFilter, PaperSort, PaperUpdate,
    },
    errors::{AppError, Result},
    metrics,
};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;
/// Highest page served; keeps the offset far from overflowing
const MAX_PAGE: u64 = 10_000;

/// Query parameters for the paper listing
#[derive(Debug, Default, Deserialize)]
pub struct ListPapersQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub q: Option<String>,
    pub source: Option<String>,
    pub sort: Option<String>,
}

impl ListPapersQuery {
    fn into_filter(self) -> Result<PaperFilter> {
        let source = match self.source.as_deref() {
            None | Some("") => None,
            Some(s) => Some(
                PaperSource::parse(s)
                    .ok_or_else(|| AppError::invalid_field("source", format!("Unknown source '{}'", s)))?,
            ),
        };

        let sort = match self.sort.as_deref() {
            None | Some("") => PaperSort::default(),
            Some(s) => PaperSort::parse(s).ok_or_else(|| {
                AppError::invalid_field("sort", "sort must be one of newest, oldest, views")
            })?,
        };

        Ok(PaperFilter {
            query: self.q,
            source,
            sort,
            page: self.page.unwrap_or(1).clamp(1, MAX_PAGE) - 1,
            per_page: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }
}

/// Request to create a new draft
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaperRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(rename = "abstract", default)]
    #[validate(length(max = 50000))]
    pub abstract_text: String,

    #[serde(default)]
    pub content: String,

    /// Free-text author names; defaults to the creator's full name
    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 1000, max = 9999))]
    pub publication_year: Option<i32>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaperRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,

    #[serde(rename = "abstract")]
    #[validate(length(max = 50000))]
    pub abstract_text: Option<String>,

    pub content: Option<String>,
    pub authors: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    #[validate(range(min = 1000, max = 9999))]
    pub publication_year: Option<i32>,
}

/// Full paper representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperResponse {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub content: String,
    pub authors: Vec<String>,
    pub author_ids: Vec<Uuid>,
    pub keywords: Vec<String>,
    pub status: String,
    pub source: String,
    pub external_id: Option<String>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    pub publication_year: Option<i32>,
    pub research_story: Option<ResearchStory>,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            authors: paper.author_names(),
            author_ids: paper.author_user_ids(),
            keywords: paper.keyword_list(),
            research_story: paper.story(),
            id: paper.id,
            owner_id: paper.owner_id,
            title: paper.title,
            abstract_text: paper.abstract_text,
            content: paper.content,
            status: paper.status,
            source: paper.source,
            external_id: paper.external_id,
            doi: paper.doi,
            journal: paper.journal,
            volume: paper.volume,
            issue: paper.issue,
            pages: paper.pages,
            url: paper.url,
            publication_year: paper.publication_year,
            view_count: paper.view_count,
            created_at: paper.created_at.to_rfc3339(),
            updated_at: paper.updated_at.to_rfc3339(),
            published_at: paper.published_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Listing entry without the body text
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub status: String,
    pub source: String,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub publication_year: Option<i32>,
    pub view_count: i64,
    pub created_at: String,
    pub published_at: Option<String>,
}

impl From<Paper> for PaperSummary {
    fn from(paper: Paper) -> Self {
        Self {
            authors: paper.author_names(),
            keywords: paper.keyword_list(),
            id: paper.id,
            title: paper.title,
            abstract_text: paper.abstract_text,
            status: paper.status,
            source: paper.source,
            doi: paper.doi,
            journal: paper.journal,
            publication_year: paper.publication_year,
            view_count: paper.view_count,
            created_at: paper.created_at.to_rfc3339(),
            published_at: paper.published_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct PaperListResponse {
    pub papers: Vec<PaperSummary>,
    pub pagination: Pagination,
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Published papers
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<ListPapersQuery>,
) -> Result<Json<PaperListResponse>> {
    let filter = query.into_filter()?;
    let (papers, total) = state.repo().list_published_papers(&filter).await?;

    Ok(Json(PaperListResponse {
        papers: papers.into_iter().map(PaperSummary::from).collect(),
        pagination: Pagination {
            page: filter.page + 1,
            limit: filter.per_page,
            total,
            total_pages: total.div_ceil(filter.per_page),
        },
    }))
}

/// Papers the caller authors, drafts included
pub async fn my_papers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PaperSummary>>> {
    let papers = state.repo().list_papers_by_author(auth.user_id).await?;

    Ok(Json(papers.into_iter().map(PaperSummary::from).collect()))
}

/// Create a draft owned by the caller
pub async fn create_paper(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePaperRequest>,
) -> Result<(StatusCode, Json<PaperResponse>)> {
    request.validate()?;
    let title = required_text("title", &request.title)?;

    let repo = state.repo();
    let user = repo
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: auth.user_id.to_string() })?;

    let mut authors = clean_names(request.authors);
    if authors.is_empty() {
        authors.push(user.full_name.clone());
    }

    let mut new = NewPaper::draft(user.id, title);
    new.abstract_text = request.abstract_text;
    new.content = request.content;
    new.authors = authors;
    new.keywords = clean_names(request.keywords);
    new.doi = request.doi;
    new.journal = request.journal;
    new.volume = request.volume;
    new.issue = request.issue;
    new.pages = request.pages;
    new.url = request.url;
    new.publication_year = request.publication_year;

    let paper = repo.create_paper(new).await?;

    tracing::info!(paper_id = %paper.id, user_id = %user.id, "Draft created");

    Ok((StatusCode::CREATED, Json(paper.into())))
}

/// Get a paper by ID; counts a view for published papers
pub async fn get_paper(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<PaperResponse>> {
    let repo = state.repo();
    let mut paper = visible_paper(&repo, paper_id, viewer.user_id()).await?;

    if paper.is_published() {
        repo.increment_view_count(paper.id).await?;
        paper.view_count += 1;
    }

    Ok(Json(paper.into()))
}

/// Edit a paper (any platform author)
pub async fn update_paper(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<UpdatePaperRequest>,
) -> Result<Json<PaperResponse>> {
    request.validate()?;

    let title = match request.title {
        Some(ref t) => Some(required_text("title", t)?),
        None => None,
    };

    let repo = state.repo();
    let paper = authored_paper(&repo, paper_id, auth.user_id).await?;

    let update = PaperUpdate {
        title,
        abstract_text: request.abstract_text,
        content: request.content,
        authors: request.authors.map(clean_names),
        keywords: request.keywords.map(clean_names),
        doi: request.doi,
        journal: request.journal,
        volume: request.volume,
        issue: request.issue,
        pages: request.pages,
        url: request.url,
        publication_year: request.publication_year,
    };

    let paper = repo.update_paper(paper, update).await?;

    Ok(Json(paper.into()))
}

/// Delete a paper (owner only)
pub async fn delete_paper(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = state.repo();
    let paper = repo.get_paper(paper_id).await?;

    if paper.owner_id != Some(auth.user_id) {
        return Err(AppError::Forbidden {
            message: "Only the paper's owner can delete it".to_string(),
        });
    }

    repo.delete_paper(paper.id).await?;

    tracing::info!(paper_id = %paper_id, user_id = %auth.user_id, "Paper deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Publish a draft
pub async fn publish_paper(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<PaperResponse>> {
    let repo = state.repo();
    let paper = authored_paper(&repo, paper_id, auth.user_id).await?;

    if paper.is_published() {
        return Err(AppError::Duplicate {
            message: "Paper is already published".to_string(),
        });
    }

    required_text("title", &paper.title)?;
    required_text("abstract", &paper.abstract_text)?;
    required_text("content", &paper.content)?;

    let paper = repo.publish_paper(paper).await?;
    metrics::record_paper_published();

    tracing::info!(paper_id = %paper.id, user_id = %auth.user_id, "Paper published");

    Ok(Json(paper.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        let filter = ListPapersQuery::default().into_filter().unwrap();
        assert_eq!(filter.page, 0);
        assert_eq!(filter.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.sort, PaperSort::Newest);
        assert!(filter.source.is_none());
    }

    #[test]
    fn list_query_clamps_limit() {
        let filter = ListPapersQuery {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.page, 2);
        assert_eq!(filter.per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn list_query_caps_page() {
        let filter = ListPapersQuery {
            page: Some(u64::MAX),
            limit: Some(u64::MAX),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.page, MAX_PAGE - 1);
        assert!(filter.page.checked_mul(filter.per_page).is_some());

        let filter = ListPapersQuery {
            page: Some(0),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.page, 0);
    }

    #[test]
    fn list_query_rejects_unknown_source() {
        let result = ListPapersQuery {
            source: Some("scopus".into()),
            ..Default::default()
        }
        .into_filter();
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn names_are_trimmed_and_blank_dropped() {
        assert_eq!(
            clean_names(vec![" Ada ".into(), "  ".into(), "Alan".into()]),
            vec!["Ada", "Alan"]
        );
    }
}

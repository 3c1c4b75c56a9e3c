//! Bookmark handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::{papers::PaperSummary, visible_paper};
use crate::AppState;
use paperhub_common::{auth::AuthUser, errors::Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStatus {
    pub paper_id: Uuid,
    pub bookmarked: bool,
}

/// Bookmark a paper; repeating is harmless
pub async fn add_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<BookmarkStatus>> {
    let repo = state.repo();
    let paper = visible_paper(&repo, paper_id, Some(auth.user_id)).await?;

    if repo.add_bookmark(auth.user_id, paper.id).await? {
        tracing::debug!(paper_id = %paper.id, user_id = %auth.user_id, "Bookmark added");
    }

    Ok(Json(BookmarkStatus {
        paper_id,
        bookmarked: true,
    }))
}

/// Remove a bookmark; removing a missing one is harmless
pub async fn remove_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<BookmarkStatus>> {
    state.repo().remove_bookmark(auth.user_id, paper_id).await?;

    Ok(Json(BookmarkStatus {
        paper_id,
        bookmarked: false,
    }))
}

/// The caller's bookmarked papers
pub async fn list_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PaperSummary>>> {
    let papers = state.repo().list_bookmarked_papers(auth.user_id).await?;

    Ok(Json(papers.into_iter().map(PaperSummary::from).collect()))
}

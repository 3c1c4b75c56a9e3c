//! Public user profiles

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use paperhub_common::errors::{AppError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub affiliation: Option<String>,
    pub published_papers: u64,
    pub created_at: String,
}

/// Public profile with published paper count
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicProfile>> {
    let repo = state.repo();

    let user = repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: user_id.to_string() })?;

    let published_papers = repo.count_published_by_author(user.id).await?;

    Ok(Json(PublicProfile {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        bio: user.bio,
        affiliation: user.affiliation,
        published_papers,
        created_at: user.created_at.to_rfc3339(),
    }))
}

//! Research story handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{authored_paper, visible_paper};
use crate::AppState;
use paperhub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::models::{ResearchStory, StoryLevel},
    errors::{AppError, Result},
};

#[derive(Debug, Default, Deserialize)]
pub struct StoryQuery {
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub paper_id: Uuid,
    pub story: ResearchStory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryLevelResponse {
    pub paper_id: Uuid,
    pub level: StoryLevel,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StoryBody {
    All(StoryResponse),
    Level(StoryLevelResponse),
}

/// One level of the story, or all of them
pub async fn get_story(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
    Query(query): Query<StoryQuery>,
) -> Result<Json<StoryBody>> {
    let level = match query.level.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(StoryLevel::parse(raw).ok_or_else(|| {
            AppError::invalid_field("level", "level must be general, intermediate or expert")
        })?),
    };

    let paper = visible_paper(&state.repo(), paper_id, viewer.user_id()).await?;
    let story = paper
        .story()
        .map(ResearchStory::normalized)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::not_found("research story", paper_id))?;

    let body = match level {
        None => StoryBody::All(StoryResponse { paper_id, story }),
        Some(level) => {
            let content = story
                .level(level)
                .ok_or_else(|| AppError::not_found("research story level", level.as_str()))?
                .to_string();
            StoryBody::Level(StoryLevelResponse {
                paper_id,
                level,
                content,
            })
        }
    };

    Ok(Json(body))
}

/// Replace the story (any platform author)
pub async fn set_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
    Json(story): Json<ResearchStory>,
) -> Result<Json<StoryResponse>> {
    let story = story.normalized();
    if story.is_empty() {
        return Err(AppError::Validation {
            message: "At least one story level must be provided".to_string(),
            field: None,
        });
    }

    let repo = state.repo();
    let paper = authored_paper(&repo, paper_id, auth.user_id).await?;
    let paper = repo.set_research_story(paper, story).await?;

    tracing::info!(paper_id = %paper.id, user_id = %auth.user_id, "Research story updated");

    Ok(Json(StoryResponse {
        paper_id: paper.id,
        story: paper.story().unwrap_or_default(),
    }))
}

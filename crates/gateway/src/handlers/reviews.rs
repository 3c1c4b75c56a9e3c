//! Peer review handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{author_summaries, notify_authors, required_text, visible_paper, AuthorSummary};
use crate::AppState;
use paperhub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::{
        models::{NotificationKind, Recommendation, Review},
        NewReview,
    },
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(min = 1, max = 20000))]
    pub content: String,

    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub rating: i16,
    pub content: String,
    pub recommendation: Option<String>,
    pub reviewer: Option<AuthorSummary>,
    pub created_at: String,
}

impl ReviewResponse {
    fn new(review: Review, reviewer: Option<AuthorSummary>) -> Self {
        Self {
            id: review.id,
            paper_id: review.paper_id,
            rating: review.rating,
            content: review.content,
            recommendation: review.recommendation,
            reviewer,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub average_rating: Option<f64>,
}

fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    Some(total / reviews.len() as f64)
}

/// Reviews on a paper
pub async fn list_reviews(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<ReviewListResponse>> {
    let repo = state.repo();
    visible_paper(&repo, paper_id, viewer.user_id()).await?;

    let reviews = repo.list_reviews(paper_id).await?;
    let reviewers = author_summaries(&repo, reviews.iter().map(|r| r.user_id)).await?;
    let average = average_rating(&reviews);

    Ok(Json(ReviewListResponse {
        reviews: reviews
            .into_iter()
            .map(|r| {
                let reviewer = reviewers.get(&r.user_id).cloned();
                ReviewResponse::new(r, reviewer)
            })
            .collect(),
        average_rating: average,
    }))
}

/// Submit a review: one per user, never on one's own paper
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    request.validate()?;
    let content = required_text("content", &request.content)?;

    let repo = state.repo();
    // Drafts are only visible to their authors, who cannot review them anyway
    let paper = visible_paper(&repo, paper_id, Some(auth.user_id)).await?;

    if paper.is_author(auth.user_id) {
        return Err(AppError::Forbidden {
            message: "You cannot review your own paper".to_string(),
        });
    }
    if repo.find_review_by_user(paper.id, auth.user_id).await?.is_some() {
        return Err(AppError::AlreadyReviewed { paper_id: paper.id.to_string() });
    }

    let review = repo
        .create_review(NewReview {
            paper_id: paper.id,
            user_id: auth.user_id,
            rating: request.rating,
            content,
            recommendation: request.recommendation,
        })
        .await?;
    metrics::record_review(request.recommendation.as_ref().map(Recommendation::as_str));

    notify_authors(
        &repo,
        &paper,
        auth.user_id,
        NotificationKind::Review,
        format!("{} reviewed \"{}\"", auth.username, paper.title),
    )
    .await;

    let reviewers = author_summaries(&repo, [auth.user_id]).await?;
    let reviewer = reviewers.get(&auth.user_id).cloned();

    Ok((StatusCode::CREATED, Json(ReviewResponse::new(review, reviewer))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        let request: CreateReviewRequest = serde_json::from_value(serde_json::json!({
            "rating": 6,
            "content": "Solid work",
            "recommendation": "minor_revision"
        }))
        .unwrap();

        assert_eq!(request.recommendation, Some(Recommendation::MinorRevision));
        assert!(request.validate().is_err());
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert_eq!(average_rating(&[]), None);
    }
}

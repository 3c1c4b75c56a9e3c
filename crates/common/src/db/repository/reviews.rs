//! Review operations

use super::Repository;
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder};
use uuid::Uuid;

/// Fields for a new review
#[derive(Debug, Clone)]
pub struct NewReview {
    pub paper_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub content: String,
    pub recommendation: Option<Recommendation>,
}

impl Repository {
    /// Reviews on a paper, newest first
    pub async fn list_reviews(&self, paper_id: Uuid) -> Result<Vec<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::PaperId.eq(paper_id))
            .order_by_desc(ReviewColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// The review a user left on a paper, if any
    pub async fn find_review_by_user(&self, paper_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::PaperId.eq(paper_id))
            .filter(ReviewColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a review. A second review by the same user on the same paper
    /// is rejected even when two requests race past the handler's check.
    pub async fn create_review(&self, new: NewReview) -> Result<Review> {
        let now = chrono::Utc::now();

        let review = Review {
            id: Uuid::new_v4(),
            paper_id: new.paper_id,
            user_id: new.user_id,
            rating: new.rating,
            content: new.content,
            recommendation: new.recommendation.map(|r| r.as_str().to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let inserted = ReviewEntity::insert(review.clone().into_active_model())
            .on_conflict(
                OnConflict::columns([ReviewColumn::PaperId, ReviewColumn::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        if inserted == 0 {
            return Err(AppError::AlreadyReviewed {
                paper_id: new.paper_id.to_string(),
            });
        }

        Ok(review)
    }
}

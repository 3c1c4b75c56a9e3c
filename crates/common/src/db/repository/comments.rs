//! Comment operations

use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

impl Repository {
    /// All comments on a paper, oldest first; threading is done by the caller
    pub async fn list_comments(&self, paper_id: Uuid) -> Result<Vec<Comment>> {
        CommentEntity::find()
            .filter(CommentColumn::PaperId.eq(paper_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find comment by ID
    pub async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        CommentEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a comment or reply
    pub async fn create_comment(
        &self,
        paper_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: String,
    ) -> Result<Comment> {
        let now = chrono::Utc::now();

        let comment = CommentActiveModel {
            id: Set(Uuid::new_v4()),
            paper_id: Set(paper_id),
            user_id: Set(user_id),
            parent_id: Set(parent_id),
            content: Set(content),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        comment.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Replace comment text
    pub async fn update_comment(&self, comment: Comment, content: String) -> Result<Comment> {
        let mut active: CommentActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a comment; replies go with it
    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = CommentEntity::delete_by_id(id).exec(self.write_conn()).await?;

        Ok(result.rows_affected > 0)
    }
}

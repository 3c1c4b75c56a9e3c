//! Bookmark operations

use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_orm::sea_query::OnConflict;
use uuid::Uuid;

impl Repository {
    /// Bookmark a paper. Returns false when it was already bookmarked.
    pub async fn add_bookmark(&self, user_id: Uuid, paper_id: Uuid) -> Result<bool> {
        let bookmark = BookmarkActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            paper_id: Set(paper_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        let inserted = BookmarkEntity::insert(bookmark)
            .on_conflict(
                OnConflict::columns([BookmarkColumn::UserId, BookmarkColumn::PaperId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Remove a bookmark. Returns false when there was none.
    pub async fn remove_bookmark(&self, user_id: Uuid, paper_id: Uuid) -> Result<bool> {
        let result = BookmarkEntity::delete_many()
            .filter(BookmarkColumn::UserId.eq(user_id))
            .filter(BookmarkColumn::PaperId.eq(paper_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Papers the user bookmarked, most recent bookmark first
    pub async fn list_bookmarked_papers(&self, user_id: Uuid) -> Result<Vec<Paper>> {
        let rows = BookmarkEntity::find()
            .filter(BookmarkColumn::UserId.eq(user_id))
            .order_by_desc(BookmarkColumn::CreatedAt)
            .find_also_related(PaperEntity)
            .all(self.read_conn())
            .await?;

        Ok(rows.into_iter().filter_map(|(_, paper)| paper).collect())
    }
}

//! Notification operations

use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

/// Notifications returned per listing
const LIST_LIMIT: u64 = 100;

impl Repository {
    /// Fan a notification out to each recipient
    pub async fn create_notifications(
        &self,
        recipients: &[Uuid],
        kind: NotificationKind,
        message: &str,
        paper_id: Option<Uuid>,
    ) -> Result<u64> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now();
        let rows = recipients.iter().map(|&user_id| NotificationActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            kind: Set(kind.as_str().to_string()),
            message: Set(message.to_string()),
            paper_id: Set(paper_id),
            is_read: Set(false),
            created_at: Set(now.into()),
        });

        NotificationEntity::insert_many(rows)
            .exec_without_returning(self.write_conn())
            .await
            .map_err(Into::into)
    }

    /// The user's notifications, unread first then newest first
    pub async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .filter(NotificationColumn::UserId.eq(user_id))
            .order_by_asc(NotificationColumn::IsRead)
            .order_by_desc(NotificationColumn::CreatedAt)
            .limit(LIST_LIMIT)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Mark one of the user's notifications read. Returns false when it does not exist.
    pub async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = NotificationEntity::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::Id.eq(id))
            .filter(NotificationColumn::UserId.eq(user_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Mark every unread notification read, returning how many changed
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }
}

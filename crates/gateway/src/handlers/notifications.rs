//! Notification handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use paperhub_common::{
    auth::AuthUser,
    db::models::Notification,
    errors::{AppError, Result},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
    pub paper_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            message: n.message,
            paper_id: n.paper_id,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// The caller's notifications, unread first
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<NotificationListResponse>> {
    let notifications = state.repo().list_notifications(auth.user_id).await?;
    let unread_count = notifications.iter().filter(|n| !n.is_read).count();

    Ok(Json(NotificationListResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    if !state
        .repo()
        .mark_notification_read(auth.user_id, notification_id)
        .await?
    {
        return Err(AppError::not_found("notification", notification_id));
    }

    Ok(Json(serde_json::json!({ "id": notification_id, "isRead": true })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = state.repo().mark_all_notifications_read(auth.user_id).await?;

    Ok(Json(MarkAllReadResponse { updated }))
}

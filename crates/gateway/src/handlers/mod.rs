//! API handlers module

pub mod auth;
pub mod bookmarks;
pub mod citations;
pub mod claims;
pub mod comments;
pub mod health;
pub mod notifications;
pub mod papers;
pub mod reviews;
pub mod stories;
pub mod users;

use paperhub_common::{
    db::{
        models::{NotificationKind, Paper, User},
        Repository,
    },
    errors::{AppError, Result},
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Minimal public view of a user attached to comments and reviews
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Look up the given users, keyed by id
pub(crate) async fn author_summaries(
    repo: &Repository,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, AuthorSummary>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = repo.find_users_by_ids(ids).await?;
    Ok(users.iter().map(|u| (u.id, AuthorSummary::from(u))).collect())
}

/// Load a paper the viewer may see.
///
/// Drafts are visible to their authors only; anyone else gets a 404.
pub(crate) async fn visible_paper(
    repo: &Repository,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Paper> {
    let paper = repo.get_paper(id).await?;

    if paper.is_published() || viewer.is_some_and(|uid| paper.is_author(uid)) {
        Ok(paper)
    } else {
        Err(AppError::PaperNotFound { id: id.to_string() })
    }
}

/// Load a paper and require the caller to be one of its platform authors
pub(crate) async fn authored_paper(repo: &Repository, id: Uuid, user_id: Uuid) -> Result<Paper> {
    let paper = repo.get_paper(id).await?;

    if paper.is_author(user_id) {
        Ok(paper)
    } else {
        Err(AppError::NotAuthor { paper_id: id.to_string() })
    }
}

/// Platform authors of `paper` other than `actor`
pub(crate) fn notification_recipients(paper: &Paper, actor: Uuid) -> Vec<Uuid> {
    let mut recipients: Vec<Uuid> = paper
        .author_user_ids()
        .into_iter()
        .chain(paper.owner_id)
        .filter(|id| *id != actor)
        .collect();
    recipients.sort_unstable();
    recipients.dedup();
    recipients
}

/// Notify a paper's authors. Failures are logged and never fail the request.
pub(crate) async fn notify_authors(
    repo: &Repository,
    paper: &Paper,
    actor: Uuid,
    kind: NotificationKind,
    message: String,
) {
    let recipients = notification_recipients(paper, actor);
    if recipients.is_empty() {
        return;
    }

    if let Err(e) = repo
        .create_notifications(&recipients, kind, &message, Some(paper.id))
        .await
    {
        tracing::warn!(
            error = %e,
            paper_id = %paper.id,
            kind = kind.as_str(),
            "Failed to create notifications"
        );
    }
}

/// Trimmed text, or a validation error naming `field` when blank
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::invalid_field(field, format!("{} must not be empty", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn paper(owner: Option<Uuid>, author_ids: &[Uuid]) -> Paper {
        let now = Utc::now();
        Paper {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: "On Computable Numbers".into(),
            abstract_text: String::new(),
            content: String::new(),
            authors: serde_json::json!(["Alan Turing"]),
            author_ids: serde_json::json!(author_ids.iter().map(Uuid::to_string).collect::<Vec<_>>()),
            keywords: serde_json::json!([]),
            status: "published".into(),
            source: "platform".into(),
            external_id: None,
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: Some(1936),
            research_story: None,
            view_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: Some(now.into()),
        }
    }

    #[test]
    fn recipients_skip_the_actor() {
        let owner = Uuid::from_u128(1);
        let coauthor = Uuid::from_u128(2);
        let actor = Uuid::from_u128(3);

        let p = paper(Some(owner), &[owner, coauthor, actor]);
        assert_eq!(notification_recipients(&p, actor), vec![owner, coauthor]);
        assert_eq!(notification_recipients(&p, owner), vec![coauthor, actor]);
    }

    #[test]
    fn ownerless_import_without_authors_notifies_nobody() {
        let p = paper(None, &[]);
        assert!(notification_recipients(&p, Uuid::new_v4()).is_empty());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(required_text("content", "  \n ").is_err());
        assert_eq!(required_text("content", "  hi ").unwrap(), "hi");
    }
}

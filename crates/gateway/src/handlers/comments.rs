//! Threaded comment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use super::{author_summaries, notify_authors, required_text, visible_paper, AuthorSummary};
use crate::AppState;
use paperhub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::models::{Comment, NotificationKind},
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    /// Comment being replied to
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author: Option<AuthorSummary>,
    pub created_at: String,
    pub updated_at: String,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn new(comment: Comment, author: Option<AuthorSummary>) -> Self {
        Self {
            id: comment.id,
            paper_id: comment.paper_id,
            parent_id: comment.parent_id,
            content: comment.content,
            author,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
            replies: Vec::new(),
        }
    }
}

/// Nest replies under their parents, keeping the input (chronological) order.
/// Replies whose parent is missing are promoted to the top level.
pub fn build_thread(
    comments: Vec<Comment>,
    authors: &HashMap<Uuid, AuthorSummary>,
) -> Vec<CommentNode> {
    let ids: std::collections::HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match comment.parent_id {
            Some(parent) if parent != comment.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }

    fn attach(
        comment: Comment,
        children: &mut HashMap<Uuid, Vec<Comment>>,
        authors: &HashMap<Uuid, AuthorSummary>,
    ) -> CommentNode {
        let replies = children.remove(&comment.id).unwrap_or_default();
        let author = authors.get(&comment.user_id).cloned();
        let mut node = CommentNode::new(comment, author);
        node.replies = replies
            .into_iter()
            .map(|reply| attach(reply, children, authors))
            .collect();
        node
    }

    let mut thread: Vec<CommentNode> = roots
        .into_iter()
        .map(|root| attach(root, &mut children, authors))
        .collect();

    // Parent cycles never reach a root
    let mut stranded: Vec<Comment> = children.drain().flat_map(|(_, c)| c).collect();
    stranded.sort_by_key(|c| c.created_at);
    thread.extend(stranded.into_iter().map(|c| {
        let author = authors.get(&c.user_id).cloned();
        CommentNode::new(c, author)
    }));

    thread
}

/// Comments on a paper as a thread
pub async fn list_comments(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<Vec<CommentNode>>> {
    let repo = state.repo();
    visible_paper(&repo, paper_id, viewer.user_id()).await?;

    let comments = repo.list_comments(paper_id).await?;
    let authors = author_summaries(&repo, comments.iter().map(|c| c.user_id)).await?;

    Ok(Json(build_thread(comments, &authors)))
}

/// Post a comment or reply
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentNode>)> {
    request.validate()?;
    let content = required_text("content", &request.content)?;

    let repo = state.repo();
    let paper = visible_paper(&repo, paper_id, Some(auth.user_id)).await?;

    if let Some(parent_id) = request.parent_id {
        let parent = repo
            .find_comment_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound { id: parent_id.to_string() })?;
        if parent.paper_id != paper.id {
            return Err(AppError::invalid_field(
                "parentId",
                "Parent comment belongs to a different paper",
            ));
        }
    }

    let comment = repo
        .create_comment(paper.id, auth.user_id, request.parent_id, content)
        .await?;
    metrics::record_comment();

    notify_authors(
        &repo,
        &paper,
        auth.user_id,
        NotificationKind::Comment,
        format!("{} commented on \"{}\"", auth.username, paper.title),
    )
    .await;

    let authors = author_summaries(&repo, [auth.user_id]).await?;
    let author = authors.get(&auth.user_id).cloned();

    Ok((StatusCode::CREATED, Json(CommentNode::new(comment, author))))
}

/// Edit a comment (its author only)
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentNode>> {
    request.validate()?;
    let content = required_text("content", &request.content)?;

    let repo = state.repo();
    let comment = repo
        .find_comment_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::CommentNotFound { id: comment_id.to_string() })?;

    if comment.user_id != auth.user_id {
        return Err(AppError::Forbidden {
            message: "Only the comment's author can edit it".to_string(),
        });
    }

    let comment = repo.update_comment(comment, content).await?;
    let authors = author_summaries(&repo, [comment.user_id]).await?;
    let author = authors.get(&comment.user_id).cloned();

    Ok(Json(CommentNode::new(comment, author)))
}

/// Delete a comment (its author or the paper's owner)
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = state.repo();
    let comment = repo
        .find_comment_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::CommentNotFound { id: comment_id.to_string() })?;

    if comment.user_id != auth.user_id {
        let paper = repo.get_paper(comment.paper_id).await?;
        if paper.owner_id != Some(auth.user_id) {
            return Err(AppError::Forbidden {
                message: "Only the comment's author or the paper's owner can delete it".to_string(),
            });
        }
    }

    repo.delete_comment(comment.id).await?;

    tracing::info!(comment_id = %comment_id, user_id = %auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: u128, parent: Option<u128>, user: Uuid) -> Comment {
        let now = Utc::now();
        Comment {
            id: Uuid::from_u128(id),
            paper_id: Uuid::nil(),
            user_id: user,
            parent_id: parent.map(Uuid::from_u128),
            content: format!("comment {}", id),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn replies_nest_under_parents() {
        let user = Uuid::new_v4();
        let comments = vec![
            comment(1, None, user),
            comment(2, Some(1), user),
            comment(3, None, user),
            comment(4, Some(2), user),
        ];

        let thread = build_thread(comments, &HashMap::new());

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, Uuid::from_u128(1));
        assert_eq!(thread[0].replies.len(), 1);
        assert_eq!(thread[0].replies[0].replies[0].id, Uuid::from_u128(4));
        assert!(thread[1].replies.is_empty());
    }

    #[test]
    fn orphans_become_roots() {
        let user = Uuid::new_v4();
        let comments = vec![comment(5, Some(99), user)];

        let thread = build_thread(comments, &HashMap::new());
        assert_eq!(thread.len(), 1);
        assert!(thread[0].author.is_none());
    }

    #[test]
    fn authors_are_attached() {
        let user = Uuid::new_v4();
        let mut authors = HashMap::new();
        authors.insert(
            user,
            AuthorSummary {
                id: user,
                username: "ada".into(),
                full_name: "Ada Lovelace".into(),
            },
        );

        let thread = build_thread(vec![comment(1, None, user)], &authors);
        assert_eq!(thread[0].author.as_ref().unwrap().username, "ada");
    }
}

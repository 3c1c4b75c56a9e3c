//! Authorship claims on imported papers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    notify_authors,
    papers::{PaperResponse, PaperSummary},
};
use crate::AppState;
use paperhub_common::{
    auth::AuthUser,
    authorship::{best_match, name_similarity},
    db::models::{NotificationKind, Paper, PaperSource, User},
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    /// Free-text author name on the paper being claimed
    #[validate(length(min = 1, max = 300))]
    pub author_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialClaim {
    pub paper: PaperSummary,
    pub author_name: String,
    pub similarity: f64,
}

#[derive(Debug, Serialize)]
pub struct PotentialClaimsResponse {
    pub claims: Vec<PotentialClaim>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub paper: PaperResponse,
    pub author_name: String,
    pub similarity: f64,
}

async fn current_user(state: &AppState, auth: &AuthUser) -> Result<User> {
    state
        .repo()
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: auth.user_id.to_string() })
}

/// Rank candidate papers by how well one of their authors matches `full_name`
pub fn rank_claims(full_name: &str, papers: Vec<Paper>, threshold: f64) -> Vec<PotentialClaim> {
    let mut claims: Vec<PotentialClaim> = papers
        .into_iter()
        .filter_map(|paper| {
            let names = paper.author_names();
            let found = best_match(full_name, names.iter().map(String::as_str), threshold)?;
            Some(PotentialClaim {
                paper: paper.into(),
                author_name: found.author_name,
                similarity: found.similarity,
            })
        })
        .collect();

    claims.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    claims
}

/// Imported papers listing a name close to the caller's
pub async fn potential_claims(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PotentialClaimsResponse>> {
    let user = current_user(&state, &auth).await?;
    let cfg = &state.config.claims;

    let candidates = state
        .repo()
        .list_unclaimed_imports(user.id, cfg.scan_limit)
        .await?;

    Ok(Json(PotentialClaimsResponse {
        claims: rank_claims(&user.full_name, candidates, cfg.similarity_threshold),
    }))
}

/// Add the caller to a paper's platform authors
pub async fn claim_paper(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(paper_id): Path<Uuid>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>> {
    request.validate()?;

    let user = current_user(&state, &auth).await?;
    let repo = state.repo();
    let paper = repo.get_paper(paper_id).await?;

    // Drafts stay hidden from non-authors
    if !paper.is_published() {
        return Err(AppError::PaperNotFound { id: paper.id.to_string() });
    }
    if paper.paper_source() == Some(PaperSource::Platform) {
        return Err(AppError::Forbidden {
            message: "Only imported papers can be claimed".to_string(),
        });
    }

    let author_name = request.author_name.trim();
    if !paper.author_names().iter().any(|a| a.trim() == author_name) {
        return Err(AppError::invalid_field(
            "authorName",
            "Name is not listed among the paper's authors",
        ));
    }

    if paper.author_user_ids().contains(&user.id) {
        return Err(AppError::AlreadyClaimed { paper_id: paper.id.to_string() });
    }

    let similarity = name_similarity(&user.full_name, author_name);
    if similarity < state.config.claims.similarity_threshold {
        return Err(AppError::Forbidden {
            message: "Author name does not match your profile name".to_string(),
        });
    }

    let paper = repo.add_author_id(paper, user.id).await?;
    metrics::record_claim();

    tracing::info!(
        paper_id = %paper.id,
        user_id = %user.id,
        author_name,
        similarity,
        "Authorship claimed"
    );

    notify_authors(
        &repo,
        &paper,
        user.id,
        NotificationKind::Claim,
        format!("{} claimed authorship of \"{}\" as {}", user.full_name, paper.title, author_name),
    )
    .await;

    Ok(Json(ClaimResponse {
        author_name: author_name.to_string(),
        similarity,
        paper: paper.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn imported(title: &str, authors: &[&str]) -> Paper {
        let now = Utc::now();
        Paper {
            id: Uuid::new_v4(),
            owner_id: None,
            title: title.into(),
            abstract_text: String::new(),
            content: String::new(),
            authors: serde_json::json!(authors),
            author_ids: serde_json::json!([]),
            keywords: serde_json::json!([]),
            status: "published".into(),
            source: "arxiv".into(),
            external_id: Some(title.into()),
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: Some(2020),
            research_story: None,
            view_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: Some(now.into()),
        }
    }

    #[test]
    fn ranks_best_matches_first_and_drops_weak_ones() {
        let papers = vec![
            imported("partial", &["Grace B. Hopper"]),
            imported("exact", &["Alan Turing", "Grace Hopper"]),
            imported("unrelated", &["Edsger Dijkstra"]),
        ];

        let claims = rank_claims("Grace Hopper", papers, 0.6);

        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].paper.title, "exact");
        assert_eq!(claims[0].author_name, "Grace Hopper");
        assert_eq!(claims[0].similarity, 1.0);
        assert!((claims[1].similarity - 2.0 / 3.0).abs() < 1e-9);
    }
}

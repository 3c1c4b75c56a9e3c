//! Citation handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::visible_paper;
use crate::AppState;
use paperhub_common::{
    auth::MaybeAuthUser,
    citation::{format_all, format_citation, CitationFormat},
    errors::{AppError, Result},
};

#[derive(Debug, Default, Deserialize)]
pub struct CiteQuery {
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationResponse {
    pub paper_id: Uuid,
    pub format: CitationFormat,
    pub citation: String,
}

#[derive(Debug, Serialize)]
pub struct FormattedCitation {
    pub format: CitationFormat,
    pub citation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllCitationsResponse {
    pub paper_id: Uuid,
    pub citations: Vec<FormattedCitation>,
}

/// One citation; APA unless `format` says otherwise
pub async fn cite(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
    Query(query): Query<CiteQuery>,
) -> Result<Json<CitationResponse>> {
    let format = match query.format.as_deref() {
        None | Some("") => CitationFormat::Apa,
        Some(raw) => raw
            .parse::<CitationFormat>()
            .map_err(|e| AppError::invalid_field("format", e.to_string()))?,
    };

    let paper = visible_paper(&state.repo(), paper_id, viewer.user_id()).await?;
    let citation = format_citation(&paper.citation_metadata(), format);

    Ok(Json(CitationResponse {
        paper_id,
        format,
        citation,
    }))
}

/// Every supported format at once
pub async fn all_citations(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<AllCitationsResponse>> {
    let paper = visible_paper(&state.repo(), paper_id, viewer.user_id()).await?;

    let citations = format_all(&paper.citation_metadata())
        .into_iter()
        .map(|(format, citation)| FormattedCitation { format, citation })
        .collect();

    Ok(Json(AllCitationsResponse {
        paper_id,
        citations,
    }))
}

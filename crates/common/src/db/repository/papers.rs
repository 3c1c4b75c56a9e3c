//! Paper operations

use super::Repository;
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

/// Fields for a new paper
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub abstract_text: String,
    pub content: String,
    pub authors: Vec<String>,
    pub author_ids: Vec<Uuid>,
    pub keywords: Vec<String>,
    pub status: PaperStatus,
    pub source: PaperSource,
    pub external_id: Option<String>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    pub publication_year: Option<i32>,
}

impl NewPaper {
    /// A platform draft with only the essentials filled in
    pub fn draft(owner_id: Uuid, title: String) -> Self {
        Self {
            owner_id: Some(owner_id),
            title,
            abstract_text: String::new(),
            content: String::new(),
            authors: Vec::new(),
            author_ids: vec![owner_id],
            keywords: Vec::new(),
            status: PaperStatus::Draft,
            source: PaperSource::Platform,
            external_id: None,
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: None,
        }
    }
}

/// Editable paper fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct PaperUpdate {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub content: Option<String>,
    pub authors: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    pub publication_year: Option<i32>,
}

/// Ordering for paper listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaperSort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
}

impl PaperSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(PaperSort::Newest),
            "oldest" => Some(PaperSort::Oldest),
            "views" => Some(PaperSort::MostViewed),
            _ => None,
        }
    }
}

/// Listing filter for published papers
#[derive(Debug, Clone, Default)]
pub struct PaperFilter {
    pub query: Option<String>,
    pub source: Option<PaperSource>,
    pub sort: PaperSort,
    /// Zero-based page
    pub page: u64,
    pub per_page: u64,
}

fn json_strings<I, T>(items: I) -> serde_json::Value
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    serde_json::Value::Array(
        items
            .into_iter()
            .map(|i| serde_json::Value::String(i.to_string()))
            .collect(),
    )
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `author_ids @> '["<id>"]'`
fn authored_by(user_id: Uuid) -> Condition {
    Condition::any()
        .add(PaperColumn::OwnerId.eq(user_id))
        .add(Expr::cust_with_values(
            "author_ids @> ?",
            [json_strings([user_id])],
        ))
}

impl Repository {
    /// Create a new paper
    pub async fn create_paper(&self, new: NewPaper) -> Result<Paper> {
        let now = chrono::Utc::now();
        let published_at = match new.status {
            PaperStatus::Published => Some(now.into()),
            PaperStatus::Draft => None,
        };

        let paper = PaperActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(new.owner_id),
            title: Set(new.title),
            abstract_text: Set(new.abstract_text),
            content: Set(new.content),
            authors: Set(json_strings(new.authors)),
            author_ids: Set(json_strings(new.author_ids)),
            keywords: Set(json_strings(new.keywords)),
            status: Set(new.status.into()),
            source: Set(new.source.as_str().to_string()),
            external_id: Set(new.external_id),
            doi: Set(new.doi),
            journal: Set(new.journal),
            volume: Set(new.volume),
            issue: Set(new.issue),
            pages: Set(new.pages),
            url: Set(new.url),
            publication_year: Set(new.publication_year),
            research_story: Set(None),
            view_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            published_at: Set(published_at),
        };

        paper.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find paper by ID
    pub async fn find_paper_by_id(&self, id: Uuid) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find paper by ID or fail with PaperNotFound
    pub async fn get_paper(&self, id: Uuid) -> Result<Paper> {
        self.find_paper_by_id(id)
            .await?
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })
    }

    /// Find an imported paper by its upstream identifier
    pub async fn find_paper_by_external_id(
        &self,
        source: PaperSource,
        external_id: &str,
    ) -> Result<Option<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::Source.eq(source.as_str()))
            .filter(PaperColumn::ExternalId.eq(external_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List published papers with filtering and pagination
    pub async fn list_published_papers(&self, filter: &PaperFilter) -> Result<(Vec<Paper>, u64)> {
        let mut query = PaperEntity::find()
            .filter(PaperColumn::Status.eq(String::from(PaperStatus::Published)));

        if let Some(source) = filter.source {
            query = query.filter(PaperColumn::Source.eq(source.as_str()));
        }

        if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(PaperColumn::Title))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(PaperColumn::AbstractText))).like(pattern)),
            );
        }

        query = match filter.sort {
            PaperSort::Newest => query.order_by_desc(PaperColumn::PublishedAt),
            PaperSort::Oldest => query.order_by_asc(PaperColumn::PublishedAt),
            PaperSort::MostViewed => query.order_by_desc(PaperColumn::ViewCount),
        };

        let paginator = query.paginate(self.read_conn(), filter.per_page.max(1));
        let total = paginator.num_items().await?;
        let papers = paginator.fetch_page(filter.page).await?;

        Ok((papers, total))
    }

    /// Papers the user owns or is listed as a platform author on, drafts included
    pub async fn list_papers_by_author(&self, user_id: Uuid) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(authored_by(user_id))
            .order_by_desc(PaperColumn::UpdatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count of published papers the user authors
    pub async fn count_published_by_author(&self, user_id: Uuid) -> Result<u64> {
        PaperEntity::find()
            .filter(PaperColumn::Status.eq(String::from(PaperStatus::Published)))
            .filter(authored_by(user_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Imported papers the user is not yet an author of
    pub async fn list_unclaimed_imports(&self, user_id: Uuid, limit: u64) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::Source.ne(PaperSource::Platform.as_str()))
            .filter(authored_by(user_id).not())
            .order_by_desc(PaperColumn::CreatedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Every paper, oldest first (maintenance tooling)
    pub async fn list_all_papers(&self) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .order_by_asc(PaperColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Apply an edit to a paper
    pub async fn update_paper(&self, paper: Paper, update: PaperUpdate) -> Result<Paper> {
        let mut active: PaperActiveModel = paper.into();

        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(abstract_text) = update.abstract_text {
            active.abstract_text = Set(abstract_text);
        }
        if let Some(content) = update.content {
            active.content = Set(content);
        }
        if let Some(authors) = update.authors {
            active.authors = Set(json_strings(authors));
        }
        if let Some(keywords) = update.keywords {
            active.keywords = Set(json_strings(keywords));
        }
        if let Some(doi) = update.doi {
            active.doi = Set(blank_to_none(doi));
        }
        if let Some(journal) = update.journal {
            active.journal = Set(blank_to_none(journal));
        }
        if let Some(volume) = update.volume {
            active.volume = Set(blank_to_none(volume));
        }
        if let Some(issue) = update.issue {
            active.issue = Set(blank_to_none(issue));
        }
        if let Some(pages) = update.pages {
            active.pages = Set(blank_to_none(pages));
        }
        if let Some(url) = update.url {
            active.url = Set(blank_to_none(url));
        }
        if let Some(year) = update.publication_year {
            active.publication_year = Set(Some(year));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Mark a paper published
    pub async fn publish_paper(&self, paper: Paper) -> Result<Paper> {
        let now = chrono::Utc::now();
        let mut active: PaperActiveModel = paper.into();
        active.status = Set(PaperStatus::Published.into());
        active.published_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Replace the research story
    pub async fn set_research_story(&self, paper: Paper, story: ResearchStory) -> Result<Paper> {
        let mut active: PaperActiveModel = paper.into();
        active.research_story = Set(Some(serde_json::to_value(story)?));
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Append a platform author id; no-op when already present
    pub async fn add_author_id(&self, paper: Paper, user_id: Uuid) -> Result<Paper> {
        let mut ids = paper.author_user_ids();
        if ids.contains(&user_id) {
            return Ok(paper);
        }
        ids.push(user_id);

        let mut active: PaperActiveModel = paper.into();
        active.author_ids = Set(json_strings(ids));
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Bump the view counter without loading the row
    pub async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        PaperEntity::update_many()
            .col_expr(PaperColumn::ViewCount, Expr::col(PaperColumn::ViewCount).add(1))
            .filter(PaperColumn::Id.eq(id))
            .exec(self.write_conn())
            .await?;

        Ok(())
    }

    /// Delete paper by ID
    pub async fn delete_paper(&self, id: Uuid) -> Result<bool> {
        let result = PaperEntity::delete_by_id(id).exec(self.write_conn()).await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_lists_owner_as_author_id() {
        let owner = Uuid::new_v4();
        let draft = NewPaper::draft(owner, "Title".into());
        assert_eq!(draft.author_ids, vec![owner]);
        assert_eq!(draft.status, PaperStatus::Draft);
        assert_eq!(draft.source, PaperSource::Platform);
    }

    #[test]
    fn json_strings_stringifies_ids() {
        let id = Uuid::nil();
        assert_eq!(
            json_strings([id]),
            serde_json::json!(["00000000-0000-0000-0000-000000000000"])
        );
    }

    #[test]
    fn sort_names() {
        assert_eq!(PaperSort::parse("views"), Some(PaperSort::MostViewed));
        assert_eq!(PaperSort::parse("random"), None);
    }
}

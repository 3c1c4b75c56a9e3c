//! Paper entity

use crate::citation::CitationMetadata;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperStatus {
    Draft,
    Published,
}

impl From<String> for PaperStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "published" => PaperStatus::Published,
            _ => PaperStatus::Draft,
        }
    }
}

impl From<PaperStatus> for String {
    fn from(status: PaperStatus) -> Self {
        match status {
            PaperStatus::Draft => "draft".to_string(),
            PaperStatus::Published => "published".to_string(),
        }
    }
}

/// Where a paper came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSource {
    Platform,
    Arxiv,
    Pubmed,
}

impl PaperSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSource::Platform => "platform",
            PaperSource::Arxiv => "arxiv",
            PaperSource::Pubmed => "pubmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "platform" => Some(PaperSource::Platform),
            "arxiv" => Some(PaperSource::Arxiv),
            "pubmed" => Some(PaperSource::Pubmed),
            _ => None,
        }
    }
}

/// Reading level of a research story
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLevel {
    General,
    Intermediate,
    Expert,
}

impl StoryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryLevel::General => "general",
            StoryLevel::Intermediate => "intermediate",
            StoryLevel::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Some(StoryLevel::General),
            "intermediate" => Some(StoryLevel::Intermediate),
            "expert" => Some(StoryLevel::Expert),
            _ => None,
        }
    }
}

/// Plain-language retellings of a paper at three depths
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert: Option<String>,
}

impl ResearchStory {
    pub fn level(&self, level: StoryLevel) -> Option<&str> {
        let text = match level {
            StoryLevel::General => &self.general,
            StoryLevel::Intermediate => &self.intermediate,
            StoryLevel::Expert => &self.expert,
        };
        text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Blank levels collapse to `None`
    pub fn normalized(self) -> Self {
        let clean = |t: Option<String>| t.filter(|s| !s.trim().is_empty());
        Self {
            general: clean(self.general),
            intermediate: clean(self.intermediate),
            expert: clean(self.expert),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.intermediate.is_none() && self.expert.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Creating user; imported papers have none
    pub owner_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Free-text author names as a JSON array
    #[sea_orm(column_type = "JsonBinary")]
    pub authors: Json,

    /// Platform user ids (as strings) as a JSON array
    #[sea_orm(column_type = "JsonBinary")]
    pub author_ids: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: Json,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(column_type = "Text")]
    pub source: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub external_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub doi: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub journal: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub volume: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub issue: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub pages: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,

    pub publication_year: Option<i32>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub research_story: Option<Json>,

    pub view_count: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub published_at: Option<DateTimeWithTimeZone>,
}

fn string_array(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

impl Model {
    pub fn paper_status(&self) -> PaperStatus {
        PaperStatus::from(self.status.clone())
    }

    pub fn is_published(&self) -> bool {
        self.paper_status() == PaperStatus::Published
    }

    pub fn paper_source(&self) -> Option<PaperSource> {
        PaperSource::parse(&self.source)
    }

    pub fn author_names(&self) -> Vec<String> {
        string_array(&self.authors)
    }

    pub fn keyword_list(&self) -> Vec<String> {
        string_array(&self.keywords)
    }

    /// Platform author ids; malformed entries are skipped
    pub fn author_user_ids(&self) -> Vec<Uuid> {
        string_array(&self.author_ids)
            .iter()
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect()
    }

    pub fn is_author(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id) || self.author_user_ids().contains(&user_id)
    }

    pub fn story(&self) -> Option<ResearchStory> {
        self.research_story
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn citation_metadata(&self) -> CitationMetadata {
        CitationMetadata {
            title: self.title.clone(),
            authors: self.author_names(),
            year: self
                .publication_year
                .or_else(|| self.published_at.map(|dt| chrono::Datelike::year(&dt))),
            journal: self.journal.clone(),
            volume: self.volume.clone(),
            issue: self.issue.clone(),
            pages: self.pages.clone(),
            doi: self.doi.clone(),
            url: self.url.clone(),
            publisher: None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,

    #[sea_orm(has_many = "super::bookmark::Entity")]
    Bookmarks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::bookmark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmarks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

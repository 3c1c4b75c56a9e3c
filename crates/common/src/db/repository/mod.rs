//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations.
//! Operations are grouped by aggregate in the submodules.

mod bookmarks;
mod comments;
mod notifications;
mod papers;
mod reviews;
mod users;

pub use papers::{NewPaper, PaperFilter, PaperSort, PaperUpdate};
pub use reviews::NewReview;
pub use users::{NewUser, ProfileUpdate};

use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::DatabaseConnection;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Paper;
    use crate::errors::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    fn repo(db: DatabaseConnection) -> Repository {
        Repository::new(DbPool::from_connection(db))
    }

    fn affected(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn missing_paper_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Paper>::new()])
            .into_connection();

        let id = Uuid::new_v4();
        let err = repo(db).get_paper(id).await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { id: ref got } if *got == id.to_string()));
    }

    #[tokio::test]
    async fn deletes_report_whether_a_row_went_away() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1), affected(0), affected(0)])
            .into_connection();
        let repo = repo(db);

        assert!(repo.delete_paper(Uuid::new_v4()).await.unwrap());
        assert!(!repo.delete_paper(Uuid::new_v4()).await.unwrap());
        assert!(!repo.remove_bookmark(Uuid::new_v4(), Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn mark_all_read_returns_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(3)])
            .into_connection();

        assert_eq!(
            repo(db).mark_all_notifications_read(Uuid::new_v4()).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn conflicting_review_insert_is_already_reviewed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1), affected(0)])
            .into_connection();
        let repo = repo(db);

        let paper_id = Uuid::new_v4();
        let new = NewReview {
            paper_id,
            user_id: Uuid::new_v4(),
            rating: 4,
            content: "Clear and well argued.".into(),
            recommendation: Some(crate::db::models::Recommendation::Accept),
        };

        let created = repo.create_review(new.clone()).await.unwrap();
        assert_eq!(created.paper_id, paper_id);
        assert_eq!(created.recommendation.as_deref(), Some("accept"));

        let err = repo.create_review(new).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyReviewed { paper_id: ref got } if *got == paper_id.to_string()));
    }

    #[tokio::test]
    async fn existing_author_id_is_not_rewritten() {
        let user = Uuid::new_v4();
        let now = chrono::Utc::now();
        let paper = Paper {
            id: Uuid::new_v4(),
            owner_id: None,
            title: "Imported".into(),
            abstract_text: String::new(),
            content: String::new(),
            authors: serde_json::json!(["Grace Hopper"]),
            author_ids: serde_json::json!([user.to_string()]),
            keywords: serde_json::json!([]),
            status: "published".into(),
            source: "pubmed".into(),
            external_id: Some("123".into()),
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: None,
            research_story: None,
            view_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: Some(now.into()),
        };

        // No database round trip
        let repo = repo(DatabaseConnection::Disconnected);
        let same = repo.add_author_id(paper.clone(), user).await.unwrap();
        assert_eq!(same, paper);
    }
}

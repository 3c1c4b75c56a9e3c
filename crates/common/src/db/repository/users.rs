//! User operations

use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}

/// Profile fields a user may change; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub affiliation: Option<String>,
}

impl Repository {
    /// Create a new user
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let now = chrono::Utc::now();

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new.username),
            email: Set(new.email.to_lowercase()),
            password_hash: Set(new.password_hash),
            full_name: Set(new.full_name),
            bio: Set(None),
            affiliation: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        user.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find users by IDs, in no particular order
    pub async fn find_users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        UserEntity::find()
            .filter(UserColumn::Id.is_in(ids))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by email (case-insensitive) or exact username
    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let login = login.trim();

        UserEntity::find()
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(UserColumn::Email))).eq(login.to_lowercase()))
                    .add(UserColumn::Username.eq(login)),
            )
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Whether the username or email is already registered
    pub async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let count = UserEntity::find()
            .filter(
                Condition::any()
                    .add(UserColumn::Username.eq(username))
                    .add(Expr::expr(Func::lower(Expr::col(UserColumn::Email))).eq(email.to_lowercase())),
            )
            .count(self.read_conn())
            .await?;

        Ok(count > 0)
    }

    /// Apply a profile update
    pub async fn update_profile(&self, user: User, update: ProfileUpdate) -> Result<User> {
        let mut active: UserActiveModel = user.into();

        if let Some(full_name) = update.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(bio) = update.bio {
            active.bio = Set(Some(bio).filter(|b| !b.trim().is_empty()));
        }
        if let Some(affiliation) = update.affiliation {
            active.affiliation = Set(Some(affiliation).filter(|a| !a.trim().is_empty()));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }
}

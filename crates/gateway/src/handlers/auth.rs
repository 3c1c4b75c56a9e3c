//! Registration, login and the current user's profile

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::AppState;
use paperhub_common::{
    auth::{hash_password, verify_password, AuthUser},
    db::{models::User, NewUser, ProfileUpdate},
    errors::{AppError, Result},
};

fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars"))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30), custom(function = "validate_username"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    pub password: String,

    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address or username
    #[serde(alias = "email", alias = "username")]
    #[validate(length(min = 1))]
    pub login: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,

    #[validate(length(max = 2000))]
    pub bio: Option<String>,

    #[validate(length(max = 200))]
    pub affiliation: Option<String>,
}

/// The signed-in user's own view of their account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub affiliation: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            bio: user.bio,
            affiliation: user.affiliation,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse> {
    let token = state.jwt.generate_token(user.id, &user.username)?;
    Ok(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.expiration_secs(),
        user: user.into(),
    })
}

/// Create an account and sign it in
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    let min_len = state.config.auth.min_password_length;
    if request.password.chars().count() < min_len {
        return Err(AppError::invalid_field(
            "password",
            format!("Password must be at least {} characters", min_len),
        ));
    }

    let repo = state.repo();
    let email = request.email.trim().to_lowercase();

    if repo.username_or_email_taken(&request.username, &email).await? {
        return Err(AppError::Duplicate {
            message: "Username or email is already registered".to_string(),
        });
    }

    let user = repo
        .create_user(NewUser {
            username: request.username,
            email,
            password_hash: hash_password(&request.password)?,
            full_name: request.full_name.trim().to_string(),
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

/// Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    request.validate()?;

    let user = state
        .repo()
        .find_user_by_login(&request.login)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Failed login");
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(auth_response(&state, user)?))
}

/// Current user
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserResponse>> {
    let user = state
        .repo()
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: auth.user_id.to_string() })?;

    Ok(Json(user.into()))
}

/// Update the current user's profile
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    request.validate()?;

    let full_name = match request.full_name {
        Some(name) => Some(super::required_text("fullName", &name)?),
        None => None,
    };

    let repo = state.repo();
    let user = repo
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: auth.user_id.to_string() })?;

    let user = repo
        .update_profile(
            user,
            ProfileUpdate {
                full_name,
                bio: request.bio,
                affiliation: request.affiliation,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_charset() {
        assert!(validate_username("ada_lovelace-1815").is_ok());
        assert!(validate_username("ada lovelace").is_err());
        assert!(validate_username("ada@home").is_err());
    }

    #[test]
    fn register_request_validation() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "ab",
            "email": "not-an-email",
            "password": "longenough",
            "fullName": "Ada Lovelace"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn login_accepts_email_alias() {
        let request: LoginRequest = serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "password": "secret"
        }))
        .unwrap();
        assert_eq!(request.login, "ada@example.com");
    }
}

//! Domain service for user accounts and their favorite businesses.

use crate::entities::users;
use crate::services::business_service::BusinessSummary;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let re = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
    re.is_match(email)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            occupation: model.occupation,
            avatar: model.avatar,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
}

/// Profile edit. Absent or blank fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteChange {
    pub business_id: i32,
    /// `false` when the favorite was already in the requested state.
    pub changed: bool,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i32),

    #[error("Business not found: {0}")]
    BusinessNotFound(i32),

    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterUserRequest) -> Result<UserDto, UserError>;

    async fn get(&self, id: i32) -> Result<UserDto, UserError>;

    /// Edits the profile; a changed email must stay unique.
    async fn update(&self, id: i32, request: UpdateUserRequest) -> Result<UserDto, UserError>;

    /// Removes the user, their reviews and favorites.
    async fn delete(&self, id: i32) -> Result<(), UserError>;

    async fn list(&self) -> Result<Vec<UserDto>, UserError>;

    async fn add_favorite(&self, user_id: i32, business_id: i32)
    -> Result<FavoriteChange, UserError>;

    async fn remove_favorite(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> Result<FavoriteChange, UserError>;

    async fn favorites(&self, user_id: i32) -> Result<Vec<BusinessSummary>, UserError>;
}

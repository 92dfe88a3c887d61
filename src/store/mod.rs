//! Persistence layer
//!
//! The dispatcher only talks to the [`Store`] trait. Production uses
//! [`PgStore`]; tests swap in an in-memory implementation.

mod postgres;
pub mod queries;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::{Post, RegisteredUser, StoredCredentials, User};
use async_trait::async_trait;

/// One method per SQL statement the API can issue
#[async_trait]
pub trait Store: Send + Sync {
    /// All users, newest first
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// All posts joined with their author, newest first
    async fn list_posts(&self) -> Result<Vec<Post>, AppError>;

    /// Insert a user; `password` is already in its stored form
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<RegisteredUser, AppError>;

    /// Every row with exactly this username and a stored password, oldest first
    async fn find_by_username(&self, username: &str) -> Result<Vec<StoredCredentials>, AppError>;

    /// Insert a post and return its id
    async fn create_post(&self, user_id: i32, title: &str, content: &str) -> Result<i32, AppError>;

    async fn update_role(&self, user_id: i32, role: &str) -> Result<(), AppError>;

    async fn update_faction(&self, user_id: i32, faction: Option<&str>) -> Result<(), AppError>;

    async fn set_banned(&self, user_id: i32, banned: bool) -> Result<(), AppError>;

    async fn set_muted(&self, user_id: i32, muted: bool) -> Result<(), AppError>;

    async fn update_avatar(&self, user_id: i32, avatar: Option<&str>) -> Result<(), AppError>;
}

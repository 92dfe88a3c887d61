//! In-memory store for tests
//!
//! Mirrors the PostgreSQL schema closely enough for the dispatcher: ids are
//! sequential, posts must reference an existing user, updates on a missing
//! id touch nothing.

use super::Store;
use crate::error::AppError;
use crate::models::{Post, RegisteredUser, StoredCredentials, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PostRow {
    id: i32,
    user_id: i32,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredCredentials>,
    posts: Vec<PostRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_with: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail like a broken database would
    pub async fn fail_with(&self, message: &str) {
        *self.fail_with.write().await = Some(message.to_string());
    }

    /// Number of store calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw stored password for a user, to check what actually hit the table
    pub async fn stored_password(&self, user_id: i32) -> Option<String> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|row| row.user.id == user_id)
            .map(|row| row.password.clone())
    }

    async fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.read().await.as_ref() {
            Some(message) => Err(AppError::Internal(message.clone())),
            None => Ok(()),
        }
    }

    async fn update_user<F>(&self, user_id: i32, apply: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut User) + Send,
    {
        self.enter().await?;
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.users.iter_mut().find(|row| row.user.id == user_id) {
            apply(&mut row.user);
        }
        Ok(())
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX - 1) + 1
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.enter().await?;
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.iter().map(|row| row.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        self.enter().await?;
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter_map(|post| {
                let author = tables.users.iter().find(|row| row.user.id == post.user_id)?;
                Some(Post {
                    id: post.id,
                    title: post.title.clone(),
                    content: post.content.clone(),
                    created_at: post.created_at,
                    author: author.user.username.clone(),
                    author_avatar: author.user.avatar.clone(),
                })
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<RegisteredUser, AppError> {
        self.enter().await?;
        let mut tables = self.tables.write().await;
        let user = User {
            id: next_id(tables.users.len()),
            username: username.to_string(),
            role: role.to_string(),
            faction: None,
            custom_role: None,
            status: None,
            avatar: None,
            is_banned: false,
            is_muted: false,
            created_at: Utc::now(),
        };
        let registered = RegisteredUser {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            avatar: None,
        };
        tables.users.push(StoredCredentials {
            user,
            password: password.to_string(),
        });
        Ok(registered)
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<StoredCredentials>, AppError> {
        self.enter().await?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|row| row.user.username == username)
            .cloned()
            .collect())
    }

    async fn create_post(&self, user_id: i32, title: &str, content: &str) -> Result<i32, AppError> {
        self.enter().await?;
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|row| row.user.id == user_id) {
            return Err(AppError::Internal(format!(
                "insert on table \"posts\" violates foreign key constraint: user {} does not exist",
                user_id
            )));
        }
        let id = next_id(tables.posts.len());
        tables.posts.push(PostRow {
            id,
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update_role(&self, user_id: i32, role: &str) -> Result<(), AppError> {
        let role = role.to_string();
        self.update_user(user_id, |user| user.role = role).await
    }

    async fn update_faction(&self, user_id: i32, faction: Option<&str>) -> Result<(), AppError> {
        let faction = faction.map(str::to_string);
        self.update_user(user_id, |user| user.faction = faction).await
    }

    async fn set_banned(&self, user_id: i32, banned: bool) -> Result<(), AppError> {
        self.update_user(user_id, |user| user.is_banned = banned).await
    }

    async fn set_muted(&self, user_id: i32, muted: bool) -> Result<(), AppError> {
        self.update_user(user_id, |user| user.is_muted = muted).await
    }

    async fn update_avatar(&self, user_id: i32, avatar: Option<&str>) -> Result<(), AppError> {
        let avatar = avatar.map(str::to_string);
        self.update_user(user_id, |user| user.avatar = avatar).await
    }
}

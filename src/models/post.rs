//! Post-related models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post joined with its author's public details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub author_avatar: Option<String>,
}

/// Body of `POST ?action=create-post`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: i32,
    pub title: String,
    pub content: String,
}

/// Response to `create-post`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedPost {
    pub id: i32,
    pub success: bool,
}

impl CreatedPost {
    pub fn new(id: i32) -> Self {
        Self { id, success: true }
    }
}

//! User-related models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user row as exposed over the API. The password column never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub faction: Option<String>,
    pub custom_role: Option<String>,
    pub status: Option<String>,
    pub avatar: Option<String>,
    pub is_banned: bool,
    pub is_muted: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password value, used only for login matching
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password: String,
}

/// Payload returned by `register`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub avatar: Option<String>,
}

/// Body of `POST ?action=register`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// Body of `POST ?action=login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `PUT ?action=update-role`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub user_id: i32,
    pub role: String,
}

/// Body of `PUT ?action=update-faction`; a null faction clears it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFactionRequest {
    pub user_id: i32,
    #[serde(default)]
    pub faction: Option<String>,
}

/// Body of `PUT ?action=ban`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub user_id: i32,
    pub is_banned: bool,
}

/// Body of `PUT ?action=mute`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteRequest {
    pub user_id: i32,
    pub is_muted: bool,
}

/// Body of `PUT ?action=update-avatar`; a null avatar clears it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    pub user_id: i32,
    #[serde(default)]
    pub avatar: Option<String>,
}

//! Request decoding
//!
//! Turns (method, `action` query parameter, `userId`, body) into a typed
//! [`Action`]. Unknown combinations are rejected here, before any body
//! decoding or store access happens.

use crate::error::AppError;
use crate::models::{
    BanRequest, CreatePostRequest, LoginRequest, MuteRequest, RegisterRequest,
    UpdateAvatarRequest, UpdateFactionRequest, UpdateRoleRequest,
};
use axum::http::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Query string of the single endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Every operation the endpoint supports
#[derive(Debug)]
pub enum Action {
    ListUsers,
    ListPosts,
    Register(RegisterRequest),
    Login(LoginRequest),
    CreatePost(CreatePostRequest),
    UpdateRole(UpdateRoleRequest),
    UpdateFaction(UpdateFactionRequest),
    Ban(BanRequest),
    Mute(MuteRequest),
    UpdateAvatar(UpdateAvatarRequest),
    /// Soft delete; `None` when the request carried no `userId`
    DeleteUser { user_id: Option<i32> },
}

/// Which operation a request names, before its body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    ListUsers,
    ListPosts,
    Register,
    Login,
    CreatePost,
    UpdateRole,
    UpdateFaction,
    Ban,
    Mute,
    UpdateAvatar,
    DeleteUser,
}

impl Route {
    fn resolve(method: &Method, action: &str) -> Option<Self> {
        let route = match (method.as_str(), action) {
            ("GET", "users") => Route::ListUsers,
            ("GET", "posts") => Route::ListPosts,
            ("POST", "register") => Route::Register,
            ("POST", "login") => Route::Login,
            ("POST", "create-post") => Route::CreatePost,
            ("PUT", "update-role") => Route::UpdateRole,
            ("PUT", "update-faction") => Route::UpdateFaction,
            ("PUT", "ban") => Route::Ban,
            ("PUT", "mute") => Route::Mute,
            ("PUT", "update-avatar") => Route::UpdateAvatar,
            // DELETE has a single meaning whatever the action says
            ("DELETE", _) => Route::DeleteUser,
            _ => return None,
        };
        Some(route)
    }
}

impl Action {
    /// Decode a request into an action
    pub fn parse(method: &Method, query: &ActionQuery, body: &[u8]) -> Result<Self, AppError> {
        let action = query.action.as_deref().unwrap_or_default();
        let route = Route::resolve(method, action).ok_or(AppError::UnknownAction)?;

        let parsed = match route {
            Route::ListUsers => Action::ListUsers,
            Route::ListPosts => Action::ListPosts,
            Route::Register => Action::Register(decode(body)?),
            Route::Login => Action::Login(decode(body)?),
            Route::CreatePost => Action::CreatePost(decode(body)?),
            Route::UpdateRole => Action::UpdateRole(decode(body)?),
            Route::UpdateFaction => Action::UpdateFaction(decode(body)?),
            Route::Ban => Action::Ban(decode(body)?),
            Route::Mute => Action::Mute(decode(body)?),
            Route::UpdateAvatar => Action::UpdateAvatar(decode(body)?),
            Route::DeleteUser => Action::DeleteUser {
                user_id: parse_user_id(query.user_id.as_deref())?,
            },
        };

        Ok(parsed)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::ListUsers => "users",
            Action::ListPosts => "posts",
            Action::Register(_) => "register",
            Action::Login(_) => "login",
            Action::CreatePost(_) => "create-post",
            Action::UpdateRole(_) => "update-role",
            Action::UpdateFaction(_) => "update-faction",
            Action::Ban(_) => "ban",
            Action::Mute(_) => "mute",
            Action::UpdateAvatar(_) => "update-avatar",
            Action::DeleteUser { .. } => "delete",
        }
    }
}

/// Decode a JSON body; an empty body counts as `{}`
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    Ok(serde_json::from_slice(body)?)
}

fn parse_user_id(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("Invalid userId: {}", value))),
    }
}

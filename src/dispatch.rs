//! Request dispatcher
//!
//! Executes one [`Action`] against the [`Store`] and produces the reply body.
//! Holds no state between requests beyond its configuration.

use crate::action::Action;
use crate::auth::registration_role;
use crate::config::AuthConfig;
use crate::error::{ApiResult, AppError};
use crate::models::{CreatedPost, Post, RegisteredUser, SuccessResponse, User};
use crate::store::Store;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Successful reply of an action, always sent with 200
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Users(Vec<User>),
    Posts(Vec<Post>),
    Registered(RegisteredUser),
    LoggedIn(User),
    PostCreated(CreatedPost),
    Done(SuccessResponse),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub struct Dispatcher {
    store: Arc<dyn Store>,
    auth: AuthConfig,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }

    pub async fn dispatch(&self, action: Action) -> ApiResult<Reply> {
        debug!("Dispatching action '{}'", action.name());

        let reply = match action {
            Action::ListUsers => Reply::Users(self.store.list_users().await?),
            Action::ListPosts => Reply::Posts(self.store.list_posts().await?),
            Action::Register(req) => {
                let supplied = req.admin_code.as_deref().unwrap_or_default();
                let role = registration_role(self.auth.admin_code.as_deref(), supplied);
                let password = self.auth.password_storage.seal(&req.password)?;

                let user = self
                    .store
                    .create_user(&req.username, &password, role)
                    .await?;
                info!("Registered user {} ({}) as {}", user.id, user.username, user.role);
                Reply::Registered(user)
            }
            Action::Login(req) => Reply::LoggedIn(self.login(&req.username, &req.password).await?),
            Action::CreatePost(req) => {
                let id = self
                    .store
                    .create_post(req.user_id, &req.title, &req.content)
                    .await?;
                info!("User {} created post {}", req.user_id, id);
                Reply::PostCreated(CreatedPost::new(id))
            }
            Action::UpdateRole(req) => {
                self.store.update_role(req.user_id, &req.role).await?;
                info!("User {} role set to '{}'", req.user_id, req.role);
                Reply::Done(SuccessResponse::ok())
            }
            Action::UpdateFaction(req) => {
                self.store
                    .update_faction(req.user_id, req.faction.as_deref())
                    .await?;
                Reply::Done(SuccessResponse::ok())
            }
            Action::Ban(req) => {
                self.store.set_banned(req.user_id, req.is_banned).await?;
                info!("User {} banned: {}", req.user_id, req.is_banned);
                Reply::Done(SuccessResponse::ok())
            }
            Action::Mute(req) => {
                self.store.set_muted(req.user_id, req.is_muted).await?;
                info!("User {} muted: {}", req.user_id, req.is_muted);
                Reply::Done(SuccessResponse::ok())
            }
            Action::UpdateAvatar(req) => {
                self.store
                    .update_avatar(req.user_id, req.avatar.as_deref())
                    .await?;
                Reply::Done(SuccessResponse::ok())
            }
            Action::DeleteUser { user_id } => {
                match user_id {
                    Some(id) => {
                        self.store.set_banned(id, true).await?;
                        info!("User {} soft-deleted", id);
                    }
                    None => warn!("Delete without userId, nothing to do"),
                }
                Reply::Done(SuccessResponse::ok())
            }
        };

        Ok(reply)
    }

    /// Match username and password, then refuse banned accounts
    async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        let candidates = self.store.find_by_username(username).await?;

        let mut matched = None;
        for candidate in candidates {
            if self
                .auth
                .password_storage
                .verify(password, &candidate.password)?
            {
                matched = Some(candidate.user);
                break;
            }
        }

        let user =
            matched.ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        if user.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        Ok(user)
    }
}

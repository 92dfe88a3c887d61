//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains all request/response structures used by the API.

pub mod post;
pub mod user;

// Re-export commonly used types
pub use post::*;
pub use user::*;

use serde::Serialize;

/// `{"success": true}` acknowledgement for updates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

//! Authentication and authorization module
//!
//! Decides which role a new account gets and how passwords are kept in the store.

mod password;

pub use password::PasswordStorage;

/// Role given to accounts registered with the admin code
pub const ROLE_ADMIN: &str = "admin";

/// Role given to every other new account
pub const ROLE_USER: &str = "user";

/// Pick the role for a new account.
///
/// Only an exact match against a configured, non-empty admin code elevates.
pub fn registration_role(admin_code: Option<&str>, supplied: &str) -> &'static str {
    match admin_code {
        Some(code) if !code.is_empty() && code == supplied => ROLE_ADMIN,
        _ => ROLE_USER,
    }
}

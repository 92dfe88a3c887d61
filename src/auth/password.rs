//! Password storage schemes
//!
//! `Plaintext` keeps compatibility with rows written by the legacy handler.
//! `Bcrypt` stores salted hashes.

use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::str::FromStr;

/// How passwords are written to and compared against the `users.password` column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordStorage {
    #[default]
    Plaintext,
    Bcrypt,
}

impl PasswordStorage {
    /// Turn a submitted password into the value stored in the database
    pub fn seal(&self, password: &str) -> Result<String, AppError> {
        match self {
            PasswordStorage::Plaintext => Ok(password.to_string()),
            PasswordStorage::Bcrypt => hash(password, DEFAULT_COST)
                .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e))),
        }
    }

    /// Check a submitted password against a stored value
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        match self {
            PasswordStorage::Plaintext => Ok(password == stored),
            // Rows written before hashing was enabled can never match
            PasswordStorage::Bcrypt if !stored.starts_with("$2") => Ok(false),
            PasswordStorage::Bcrypt => verify(password, stored)
                .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e))),
        }
    }
}

impl FromStr for PasswordStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(PasswordStorage::Plaintext),
            "bcrypt" => Ok(PasswordStorage::Bcrypt),
            other => Err(format!(
                "Unknown PASSWORD_STORAGE '{}' (expected plaintext or bcrypt)",
                other
            )),
        }
    }
}

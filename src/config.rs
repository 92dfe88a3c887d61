//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::auth::PasswordStorage;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Raw connection string, handed to tokio-postgres as-is
    pub url: String,
    pub max_pool_size: usize,
    /// Whether the store must be reached over TLS
    pub tls: bool,
}

/// Registration and login behaviour
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Shared secret that grants the admin role at registration.
    /// `None` disables admin self-registration entirely.
    pub admin_code: Option<String>,
    pub password_storage: PasswordStorage,
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let database = DatabaseConfig {
            tls: Self::requires_tls(&database_url)?,
            url: database_url,
            max_pool_size: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(10),
        };

        let password_storage = match lookup("PASSWORD_STORAGE") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidValue)?,
            None => PasswordStorage::default(),
        };

        let auth = AuthConfig {
            admin_code: lookup("ADMIN_CODE").filter(|code| !code.is_empty()),
            password_storage,
        };

        Ok(Self {
            server,
            database,
            auth,
        })
    }

    /// Validate a DATABASE_URL (postgresql://...) and decide whether it needs TLS
    fn requires_tls(url: &str) -> Result<bool, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue(
                "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
            )
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported DATABASE_URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue("Missing host in DATABASE_URL".to_string()))?;

        let sslmode_requires_tls = parsed.query_pairs().any(|(key, value)| {
            key == "sslmode" && value == "require"
        });

        // Neon only accepts TLS connections
        Ok(sslmode_requires_tls || host.ends_with("neon.tech"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_database_url_is_required() {
        let result = settings_from(&[("PORT", "8080")]);
        assert!(matches!(result, Err(ConfigError::MissingVar(var)) if var == "DATABASE_URL"));
    }

    #[test]
    fn test_defaults_with_only_database_url() {
        let settings = settings_from(&[("DATABASE_URL", "postgres://u:p@localhost/town")]).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.max_pool_size, 10);
        assert!(!settings.database.tls);
        assert_eq!(settings.auth.admin_code, None);
        assert_eq!(settings.auth.password_storage, PasswordStorage::Plaintext);
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("DATABASE_URL", "postgresql://u:p@db:5433/town"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("ADMIN_CODE", "letmein"),
            ("PASSWORD_STORAGE", "bcrypt"),
        ])
        .unwrap();

        assert_eq!(settings.server.host, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.max_pool_size, 4);
        assert_eq!(settings.auth.admin_code.as_deref(), Some("letmein"));
        assert_eq!(settings.auth.password_storage, PasswordStorage::Bcrypt);
    }

    #[test]
    fn test_empty_admin_code_disables_elevation() {
        let settings = settings_from(&[
            ("DATABASE_URL", "postgres://u:p@localhost/town"),
            ("ADMIN_CODE", ""),
        ])
        .unwrap();
        assert_eq!(settings.auth.admin_code, None);
    }

    #[test]
    fn test_tls_detection() {
        let settings = settings_from(&[(
            "DATABASE_URL",
            "postgres://u:p@localhost/town?sslmode=require",
        )])
        .unwrap();
        assert!(settings.database.tls);

        let settings = settings_from(&[(
            "DATABASE_URL",
            "postgres://u:p@ep-cool-river-123.eu-central-1.aws.neon.tech/town",
        )])
        .unwrap();
        assert!(settings.database.tls);
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        assert!(settings_from(&[("DATABASE_URL", "mysql://u:p@localhost/town")]).is_err());
        assert!(settings_from(&[("DATABASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_rejects_unknown_password_storage() {
        let result = settings_from(&[
            ("DATABASE_URL", "postgres://u:p@localhost/town"),
            ("PASSWORD_STORAGE", "rot13"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}

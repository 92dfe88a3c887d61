//! PostgreSQL store
//!
//! Every operation checks a client out of the pool for exactly one statement.
//! The pooled object goes back to the pool when it is dropped, so error paths
//! release it as well.

use super::queries;
use super::Store;
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{Post, RegisteredUser, StoredCredentials, User};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{NoTls, Row};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{debug, info, warn};

/// Store backed by a deadpool-postgres pool
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build the pool from DATABASE_URL and verify one connection works
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pg_config = config
            .url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| AppError::Config(format!("Failed to parse DATABASE_URL: {}", e)))?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.tls {
            Manager::from_config(pg_config, Self::tls_connector(), manager_config)
        } else {
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let pool = Pool::builder(manager)
            .max_size(config.max_pool_size)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))?;

        // Test the connection
        let client = pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        drop(client);

        info!(
            "Database pool ready (TLS: {}, max size: {})",
            config.tls, config.max_pool_size
        );

        Ok(Self { pool })
    }

    /// TLS connector trusting the platform's native roots
    fn tls_connector() -> MakeRustlsConnect {
        // Fails only when a provider is already installed
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let certs = rustls_native_certs::load_native_certs();
        if !certs.errors.is_empty() {
            warn!("Skipped {} unreadable native certificates", certs.errors.len());
        }

        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        MakeRustlsConnect::new(tls_config)
    }

    /// Create the `users` and `posts` tables if they don't exist
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let client = self.pool.get().await?;

        client.batch_execute(queries::CREATE_USERS_TABLE).await?;
        client.batch_execute(queries::CREATE_POSTS_TABLE).await?;
        client
            .batch_execute(queries::CREATE_POSTS_CREATED_AT_INDEX)
            .await?;

        info!("Database tables initialized");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> Result<User, AppError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        role: row.try_get("role")?,
        faction: row.try_get("faction")?,
        custom_role: row.try_get("custom_role")?,
        status: row.try_get("status")?,
        avatar: row.try_get("avatar")?,
        is_banned: row.try_get("is_banned")?,
        is_muted: row.try_get("is_muted")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &Row) -> Result<Post, AppError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        author: row.try_get("author")?,
        author_avatar: row.try_get("author_avatar")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_USERS, &[]).await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_POSTS, &[]).await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<RegisteredUser, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(queries::INSERT_USER, &[&username, &password, &role])
            .await?;

        Ok(RegisteredUser {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            role: row.try_get("role")?,
            avatar: row.try_get("avatar")?,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<StoredCredentials>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::FIND_BY_USERNAME, &[&username]).await?;

        rows.iter()
            .map(|row| -> Result<StoredCredentials, AppError> {
                Ok(StoredCredentials {
                    user: user_from_row(row)?,
                    password: row.try_get("password")?,
                })
            })
            .collect()
    }

    async fn create_post(&self, user_id: i32, title: &str, content: &str) -> Result<i32, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(queries::INSERT_POST, &[&user_id, &title, &content])
            .await?;

        Ok(row.try_get("id")?)
    }

    async fn update_role(&self, user_id: i32, role: &str) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client.execute(queries::UPDATE_ROLE, &[&role, &user_id]).await?;
        debug!("update_role user={} rows={}", user_id, updated);
        Ok(())
    }

    async fn update_faction(&self, user_id: i32, faction: Option<&str>) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(queries::UPDATE_FACTION, &[&faction, &user_id])
            .await?;
        debug!("update_faction user={} rows={}", user_id, updated);
        Ok(())
    }

    async fn set_banned(&self, user_id: i32, banned: bool) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client.execute(queries::SET_BANNED, &[&banned, &user_id]).await?;
        debug!("set_banned user={} banned={} rows={}", user_id, banned, updated);
        Ok(())
    }

    async fn set_muted(&self, user_id: i32, muted: bool) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client.execute(queries::SET_MUTED, &[&muted, &user_id]).await?;
        debug!("set_muted user={} muted={} rows={}", user_id, muted, updated);
        Ok(())
    }

    async fn update_avatar(&self, user_id: i32, avatar: Option<&str>) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(queries::UPDATE_AVATAR, &[&avatar, &user_id])
            .await?;
        debug!("update_avatar user={} rows={}", user_id, updated);
        Ok(())
    }
}

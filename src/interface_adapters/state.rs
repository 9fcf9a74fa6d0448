use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::entities::{TelegramUser, Vault};
use crate::domain::ports::{Clock, DatabaseProbe, SessionIssuer, UserProfileStore, VaultStore};
use crate::use_cases::verify_init_data::InitDataVerifier;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    // Shared database pool for users and vaults.
    pub db: PgPool,
    pub verifier: Arc<InitDataVerifier>,
    pub sessions: Arc<dyn SessionIssuer>,
    // Development-only identity used when a request carries no bearer token.
    pub dev_user_id: Option<String>,
}

// PostgreSQL-backed vault store.
#[derive(Clone)]
pub struct PostgresVaultStore {
    pub db: PgPool,
}

// PostgreSQL-backed Telegram profile store.
#[derive(Clone)]
pub struct PostgresUserProfileStore {
    pub db: PgPool,
}

#[derive(sqlx::FromRow)]
struct VaultRow {
    user_id: String,
    blob: String,
    updated_at: DateTime<Utc>,
}

impl From<VaultRow> for Vault {
    fn from(row: VaultRow) -> Self {
        Vault {
            user_id: row.user_id,
            blob: row.blob,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl VaultStore for PostgresVaultStore {
    async fn ensure_user_and_vault(&self, user_id: &str) -> Result<Vault, String> {
        let mut tx = self.db.begin().await.map_err(|err| err.to_string())?;

        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;

        sqlx::query("INSERT INTO vaults (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;

        let row = sqlx::query_as::<_, VaultRow>(
            "SELECT user_id, blob, updated_at FROM vaults WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| err.to_string())?;

        tx.commit().await.map_err(|err| err.to_string())?;

        Ok(row.into())
    }

    async fn update_blob(&self, user_id: &str, blob: &str) -> Result<Vault, String> {
        let row = sqlx::query_as::<_, VaultRow>(
            r#"
            UPDATE vaults SET blob = $2, updated_at = now()
            WHERE user_id = $1
            RETURNING user_id, blob, updated_at
            "#,
        )
        .bind(user_id)
        .bind(blob)
        .fetch_one(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(row.into())
    }
}

#[async_trait]
impl UserProfileStore for PostgresUserProfileStore {
    // Upsert the profile using the latest identity data from Telegram.
    async fn upsert_telegram_user(&self, user: &TelegramUser) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, language_code)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                language_code = EXCLUDED.language_code,
                updated_at = now()
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.username.as_deref())
        .bind(user.first_name.as_deref())
        .bind(user.last_name.as_deref())
        .bind(user.language_code.as_deref())
        .execute(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(())
    }
}

#[async_trait]
impl DatabaseProbe for PgPool {
    async fn ping(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(self)
            .await
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

// System clock adapter used by auth use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

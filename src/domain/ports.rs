use async_trait::async_trait;

use crate::domain::entities::{IssuedSession, SessionClaims, TelegramUser, Vault};
use crate::domain::errors::AuthError;

// Port for vault persistence used by vault use cases.
#[async_trait]
pub trait VaultStore: Send + Sync {
    // Create the user and an empty vault when missing; never overwrites.
    async fn ensure_user_and_vault(&self, user_id: &str) -> Result<Vault, String>;
    async fn update_blob(&self, user_id: &str, blob: &str) -> Result<Vault, String>;
}

// Port for persisting Telegram profile fields seen at login.
#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn upsert_telegram_user(&self, user: &TelegramUser) -> Result<(), String>;
}

// Port for checking that the backing database answers queries.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), String>;
}

// Port for issuing and checking signed session credentials.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user_id: &str, issued_at: u64) -> Result<IssuedSession, String>;
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

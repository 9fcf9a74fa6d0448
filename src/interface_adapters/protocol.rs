use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{TelegramUser, Vault};

// Liveness payload shared by /health and /db-ping.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmIResponse {
    pub user_id: String,
}

// Request payload for Telegram Mini App login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramLoginRequest {
    pub init_data: String,
}

// Response payload for Telegram Mini App login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramLoginResponse {
    pub token: String,
    pub expires_at: u64,
    pub user: TelegramUser,
    pub auth_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultResponse {
    pub user_id: String,
    pub blob: String,
    pub updated_at: String,
}

impl From<Vault> for VaultResponse {
    fn from(vault: Vault) -> Self {
        Self {
            user_id: vault.user_id,
            blob: vault.blob,
            updated_at: vault.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

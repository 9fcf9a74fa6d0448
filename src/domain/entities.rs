use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Telegram user record carried in the signed `user` field of initData.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Identity claim produced only after both the signature and the age
/// checks have passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedInitData {
    pub user: TelegramUser,
    pub auth_date: i64,
    pub query_id: Option<String>,
}

// Per-user encrypted blob as stored; the server never looks inside `blob`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vault {
    pub user_id: String,
    pub blob: String,
    pub updated_at: DateTime<Utc>,
}

// Signed session credential handed back after a successful login.
#[derive(Clone, Debug)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: u64,
}

// Claims recovered from a verified session credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: String,
    pub expires_at: u64,
}

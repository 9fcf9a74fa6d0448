use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use url::form_urlencoded;

use crate::domain::entities::{IssuedSession, SessionClaims, TelegramUser, Vault};
use crate::domain::errors::AuthError;
use crate::domain::ports::{Clock, SessionIssuer, UserProfileStore, VaultStore};
use crate::use_cases::verify_init_data::{DEFAULT_MAX_AGE_SECONDS, InitDataVerifier};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

// Build a serialized initData payload signed for `bot_token`.
pub(crate) fn sign_init_data(bot_token: &str, pairs: &[(&str, &str)]) -> String {
    let verifier = InitDataVerifier::new(bot_token, DEFAULT_MAX_AGE_SECONDS);
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let hash = verifier.signature_hex(&fields);

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub ensure: bool,
    pub update: bool,
    pub upsert_user: bool,
}

#[derive(Clone, Default)]
struct Tables {
    users: HashMap<String, Option<TelegramUser>>,
    vaults: HashMap<String, Vault>,
    writes: i64,
}

// In-memory stand-in for the Postgres stores; records every write.
#[derive(Clone)]
pub(crate) struct RecordingStore {
    tables: Arc<Mutex<Tables>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_vault(&self, user_id: &str, blob: &str) {
        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        guard.users.entry(user_id.to_string()).or_insert(None);
        guard.vaults.insert(
            user_id.to_string(),
            Vault {
                user_id: user_id.to_string(),
                blob: blob.to_string(),
                updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            },
        );
    }

    pub(crate) fn get_test_vault(&self, user_id: &str) -> Option<Vault> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        guard.vaults.get(user_id).cloned()
    }

    pub(crate) fn get_test_profile(&self, user_id: &str) -> Option<TelegramUser> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        guard.users.get(user_id).cloned().flatten()
    }

    pub(crate) fn user_count(&self) -> usize {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        guard.users.len()
    }
}

#[async_trait]
impl VaultStore for RecordingStore {
    async fn ensure_user_and_vault(&self, user_id: &str) -> Result<Vault, String> {
        if self.failures.ensure {
            return Err("ensure failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        guard.users.entry(user_id.to_string()).or_insert(None);
        let vault = guard
            .vaults
            .entry(user_id.to_string())
            .or_insert_with(|| Vault {
                user_id: user_id.to_string(),
                blob: String::new(),
                updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            })
            .clone();
        Ok(vault)
    }

    async fn update_blob(&self, user_id: &str, blob: &str) -> Result<Vault, String> {
        if self.failures.update {
            return Err("update failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        guard.writes += 1;
        let updated_at = Utc.timestamp_opt(1_700_000_000 + guard.writes, 0).unwrap();
        let vault = guard
            .vaults
            .get_mut(user_id)
            .ok_or_else(|| "vault row missing".to_string())?;
        vault.blob = blob.to_string();
        vault.updated_at = updated_at;
        Ok(vault.clone())
    }
}

#[async_trait]
impl UserProfileStore for RecordingStore {
    async fn upsert_telegram_user(&self, user: &TelegramUser) -> Result<(), String> {
        if self.failures.upsert_user {
            return Err("upsert failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        guard.users.insert(user.id.to_string(), Some(user.clone()));
        Ok(())
    }
}

// Session issuer that hands out predictable tokens.
pub(crate) struct StaticSessions {
    pub ttl_seconds: u64,
    pub fail_issue: bool,
}

impl SessionIssuer for StaticSessions {
    fn issue(&self, user_id: &str, issued_at: u64) -> Result<IssuedSession, String> {
        if self.fail_issue {
            return Err("issue failed".to_string());
        }

        Ok(IssuedSession {
            token: format!("token-{user_id}"),
            expires_at: issued_at + self.ttl_seconds,
        })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        token
            .strip_prefix("token-")
            .map(|user_id| SessionClaims {
                user_id: user_id.to_string(),
                expires_at: u64::MAX,
            })
            .ok_or(AuthError::InvalidToken)
    }
}

//! Telegram Mini App `initData` verification.
//!
//! The payload is a query string signed by Telegram with a key derived from
//! the bot token:
//!
//! ```text
//! secret_key = HMAC_SHA256(key = "WebAppData", message = bot_token)
//! hash       = hex(HMAC_SHA256(key = secret_key, message = data_check_string))
//! ```
//!
//! where `data_check_string` is every field except `hash`, sorted by key and
//! rendered as `key=value` lines joined by `\n`.

use std::collections::BTreeMap;

use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use crate::domain::entities::{TelegramUser, VerifiedInitData};
use crate::domain::errors::InitDataError;
use crate::domain::ports::Clock;

type HmacSha256 = Hmac<Sha256>;

// HMAC key used to derive the signing key from the bot token.
const SECRET_KEY_LABEL: &[u8] = b"WebAppData";

pub const DEFAULT_MAX_AGE_SECONDS: u64 = 60 * 60;

/// Verifies signed `initData` payloads for a single bot.
///
/// The derived secret key is computed once at construction, so a verifier
/// can be shared across requests behind an `Arc`.
pub struct InitDataVerifier {
    secret_key: Vec<u8>,
    max_age_seconds: u64,
    max_future_skew_seconds: Option<u64>,
}

impl InitDataVerifier {
    pub fn new(bot_token: &str, max_age_seconds: u64) -> Self {
        let mut mac = keyed_mac(SECRET_KEY_LABEL);
        mac.update(bot_token.as_bytes());

        Self {
            secret_key: mac.finalize().into_bytes().to_vec(),
            max_age_seconds,
            max_future_skew_seconds: None,
        }
    }

    /// Reject payloads whose `auth_date` lies more than `seconds` ahead of
    /// the verification time. Unset by default: future timestamps pass.
    pub fn with_max_future_skew(mut self, seconds: u64) -> Self {
        self.max_future_skew_seconds = Some(seconds);
        self
    }

    // Reads the clock exactly once per call.
    pub fn verify<C: Clock + ?Sized>(
        &self,
        init_data: &str,
        clock: &C,
    ) -> Result<VerifiedInitData, InitDataError> {
        self.verify_at(init_data, clock.now_epoch_seconds())
    }

    pub fn verify_at(&self, init_data: &str, now: u64) -> Result<VerifiedInitData, InitDataError> {
        let mut fields = parse_fields(init_data);

        let hash = take_non_empty(&mut fields, "hash").ok_or(InitDataError::MissingHash)?;
        // Non-hex input can never match the decoded digest length.
        let provided = hex::decode(hash).map_err(|_| InitDataError::InvalidSignature)?;

        let mut mac = keyed_mac(&self.secret_key);
        mac.update(data_check_string(&fields).as_bytes());
        // verify_slice checks the length and compares in constant time.
        mac.verify_slice(&provided)
            .map_err(|_| InitDataError::InvalidSignature)?;

        let auth_date = take_non_empty(&mut fields, "auth_date")
            .ok_or(InitDataError::MissingAuthDate)?
            .parse::<i64>()
            .map_err(|_| InitDataError::InvalidAuthDate)?;
        self.check_age(auth_date, now)?;

        let user_raw = take_non_empty(&mut fields, "user").ok_or(InitDataError::MissingUser)?;
        let user: TelegramUser =
            serde_json::from_str(&user_raw).map_err(|_| InitDataError::MalformedUser)?;
        if user.id == 0 {
            return Err(InitDataError::MalformedUser);
        }

        let query_id = take_non_empty(&mut fields, "query_id");

        Ok(VerifiedInitData {
            user,
            auth_date,
            query_id,
        })
    }

    fn check_age(&self, auth_date: i64, now: u64) -> Result<(), InitDataError> {
        let now = i64::try_from(now).unwrap_or(i64::MAX);
        let max_age = i64::try_from(self.max_age_seconds).unwrap_or(i64::MAX);

        // Overflow only happens for absurdly old timestamps.
        let age = now
            .checked_sub(auth_date)
            .ok_or(InitDataError::StaleInitData)?;
        if age > max_age {
            return Err(InitDataError::StaleInitData);
        }

        if let Some(skew) = self.max_future_skew_seconds {
            if age < 0 && age.unsigned_abs() > skew {
                return Err(InitDataError::AuthDateInFuture);
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn signature_hex(&self, fields: &BTreeMap<String, String>) -> String {
        let mut mac = keyed_mac(&self.secret_key);
        mac.update(data_check_string(fields).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// One-shot form of [`InitDataVerifier::verify_at`].
pub fn verify_init_data(
    init_data: &str,
    bot_token: &str,
    max_age_seconds: u64,
    now: u64,
) -> Result<VerifiedInitData, InitDataError> {
    InitDataVerifier::new(bot_token, max_age_seconds).verify_at(init_data, now)
}

// Duplicate keys collapse to the last value; BTreeMap keeps byte order.
fn parse_fields(init_data: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(init_data.as_bytes())
        .into_owned()
        .collect()
}

fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn take_non_empty(fields: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    fields.remove(key).filter(|value| !value.is_empty())
}

// Both keys used here (the label and a SHA-256 digest) fit in one block, and
// HMAC zero-pads such keys to the block size, so the padded block is the key.
fn keyed_mac(key: &[u8]) -> HmacSha256 {
    let mut block = Key::<HmacSha256>::default();
    debug_assert!(key.len() <= block.len());
    block.iter_mut().zip(key).for_each(|(slot, byte)| *slot = *byte);
    <HmacSha256 as Mac>::new(&block)
}

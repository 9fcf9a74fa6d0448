//! HS256 session tokens issued after a successful Telegram login.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{IssuedSession, SessionClaims};
use crate::domain::errors::AuthError;
use crate::domain::ports::SessionIssuer;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JwtClaims {
    /// Subject (Telegram user id)
    sub: String,
    iat: u64,
    exp: u64,
}

pub struct JwtSessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl JwtSessions {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

impl SessionIssuer for JwtSessions {
    fn issue(&self, user_id: &str, issued_at: u64) -> Result<IssuedSession, String> {
        let expires_at = issued_at.saturating_add(self.ttl_seconds);
        let claims = JwtClaims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| err.to_string())?;

        Ok(IssuedSession { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(SessionClaims {
            user_id: data.claims.sub,
            expires_at: data.claims.exp,
        })
    }
}

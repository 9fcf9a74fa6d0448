use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::domain::errors::AuthError;
use crate::interface_adapters::handlers::map_auth_error;
use crate::interface_adapters::protocol::ErrorResponse;
use crate::interface_adapters::state::AppState;

/// Caller identity taken from an `Authorization: Bearer <token>` header.
///
/// Without a header, falls back to the configured development user id when
/// one is set; otherwise the request is rejected with 401.
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return state
                .dev_user_id
                .clone()
                .map(AuthUser)
                .ok_or_else(|| map_auth_error(AuthError::MissingToken));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| map_auth_error(AuthError::InvalidToken))?;

        let claims = state.sessions.verify(token).map_err(map_auth_error)?;

        Ok(AuthUser(claims.user_id))
    }
}

// The auth scheme is case-insensitive (RFC 9110); the token is not.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

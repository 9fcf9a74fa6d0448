use crate::domain::errors::{AuthError, VaultError};
use crate::domain::ports::DatabaseProbe;
use crate::interface_adapters::extractor::AuthUser;
use crate::interface_adapters::protocol::{
    ErrorResponse, OkResponse, TelegramLoginRequest, TelegramLoginResponse, VaultResponse,
    WhoAmIResponse,
};
use crate::interface_adapters::state::{
    AppState, PostgresUserProfileStore, PostgresVaultStore, SystemClock,
};
use crate::use_cases::telegram_login::TelegramLoginUseCase;
use crate::use_cases::vault::{GetVaultUseCase, PutVaultUseCase};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use tracing::{error, info, warn};

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

#[tracing::instrument(name = "whoami", skip_all, fields(user_id = %user_id))]
pub async fn whoami(AuthUser(user_id): AuthUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse { user_id })
}

#[tracing::instrument(name = "db_ping", skip_all)]
pub async fn db_ping(State(state): State<AppState>) -> Result<Json<OkResponse>, ApiError> {
    state.db.ping().await.map_err(|err| {
        error!(error = %err, "database ping failed");
        error_response(StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    })?;

    Ok(Json(OkResponse { ok: true }))
}

// Handler for exchanging Telegram initData for a session token.
#[tracing::instrument(name = "telegram_login", skip_all)]
pub async fn telegram_login(
    State(state): State<AppState>,
    payload: Result<Json<TelegramLoginRequest>, JsonRejection>,
) -> Result<Json<TelegramLoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "telegram login body rejected");
        error_response(StatusCode::BAD_REQUEST, "initData is required")
    })?;

    let use_case = TelegramLoginUseCase {
        clock: SystemClock,
        verifier: &state.verifier,
        profiles: PostgresUserProfileStore {
            db: state.db.clone(),
        },
        sessions: &*state.sessions,
    };

    let result = use_case
        .execute(&payload.init_data)
        .await
        .map_err(map_auth_error)?;

    info!(user_id = result.user.id, "telegram login succeeded");

    Ok(Json(TelegramLoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user,
        auth_date: result.auth_date,
        query_id: result.query_id,
    }))
}

#[tracing::instrument(name = "get_vault", skip_all, fields(user_id = %user_id))]
pub async fn get_vault(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<VaultResponse>, ApiError> {
    let use_case = GetVaultUseCase {
        store: PostgresVaultStore {
            db: state.db.clone(),
        },
    };

    let vault = use_case.execute(&user_id).await.map_err(map_vault_error)?;

    Ok(Json(vault.into()))
}

#[tracing::instrument(name = "put_vault", skip_all, fields(user_id = %user_id))]
pub async fn put_vault(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VaultResponse>, ApiError> {
    // A missing, unparsable or non-object body has no blob.
    let blob = body
        .ok()
        .and_then(|Json(body)| body.get("blob").cloned())
        .unwrap_or(Value::Null);

    let use_case = PutVaultUseCase {
        store: PostgresVaultStore {
            db: state.db.clone(),
        },
    };

    let vault = use_case
        .execute(&user_id, &blob)
        .await
        .map_err(map_vault_error)?;

    Ok(Json(vault.into()))
}

// Helper to build a JSON error response.
pub(crate) fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

// Every initData rejection looks the same to the client; the kind is only logged.
pub(crate) fn map_auth_error(err: AuthError) -> ApiError {
    match err {
        AuthError::InvalidInitData(reason) => {
            warn!(%reason, "telegram init data rejected");
            error_response(StatusCode::UNAUTHORIZED, "invalid init data")
        }
        AuthError::SessionIssueFailure => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to issue session")
        }
        AuthError::MissingToken => error_response(StatusCode::UNAUTHORIZED, "missing session token"),
        AuthError::InvalidToken => error_response(StatusCode::UNAUTHORIZED, "invalid session token"),
        AuthError::SessionExpired => error_response(StatusCode::UNAUTHORIZED, "session expired"),
    }
}

fn map_vault_error(err: VaultError) -> ApiError {
    match err {
        VaultError::InvalidBlob => error_response(StatusCode::BAD_REQUEST, "blob is not a string"),
        VaultError::StorageFailure(err) => {
            error!(error = %err, "vault storage failure");
            error_response(StatusCode::BAD_GATEWAY, "storage error")
        }
    }
}

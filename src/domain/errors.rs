use thiserror::Error;

// Reasons an initData payload is rejected. Each check fails with its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitDataError {
    #[error("missing hash")]
    MissingHash,
    #[error("invalid initData signature")]
    InvalidSignature,
    #[error("missing auth_date")]
    MissingAuthDate,
    #[error("invalid auth_date")]
    InvalidAuthDate,
    #[error("initData is too old")]
    StaleInitData,
    #[error("auth_date is in the future")]
    AuthDateInFuture,
    #[error("missing user")]
    MissingUser,
    #[error("invalid user payload")]
    MalformedUser,
}

// Domain-level errors for auth workflows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("init data rejected: {0}")]
    InvalidInitData(#[from] InitDataError),
    #[error("failed to issue session")]
    SessionIssueFailure,
    #[error("missing session token")]
    MissingToken,
    #[error("invalid session token")]
    InvalidToken,
    #[error("session expired")]
    SessionExpired,
}

// Domain-level errors for vault workflows.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("blob is not a string")]
    InvalidBlob,
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

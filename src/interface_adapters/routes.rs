use crate::interface_adapters::handlers::{
    db_ping, get_vault, health, put_vault, telegram_login, whoami,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/whoami", get(whoami))
        .route("/db-ping", get(db_ping))
        .route("/auth/telegram", post(telegram_login))
        .route("/vault", get(get_vault).put(put_vault))
        .with_state(state)
}

use crate::frameworks::config::{AppConfig, ConfigError};
use crate::frameworks::db;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::sessions::JwtSessions;
use crate::interface_adapters::state::AppState;
use crate::use_cases::verify_init_data::InitDataVerifier;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrations(#[from] sqlx::migrate::MigrateError),
    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> Result<(), StartupError> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let result = start().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "startup aborted");
    }
    result
}

async fn start() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    let db = db::connect_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&db).await?;
    tracing::info!("database ready");

    if config.dev_user_id.is_some() {
        tracing::warn!("TEMP_USER_ID is set; unauthenticated requests run as that user");
    }
    let state = build_state(&config, db);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await.inspect_err(|e| {
        tracing::error!(%addr, error = %e, "failed to bind");
    })?;
    tracing::info!(%addr, "listening");

    serve(listener, state).await
}

// Wire the verifier, session issuer and pool into the shared handler state.
fn build_state(config: &AppConfig, db: PgPool) -> AppState {
    let mut verifier = InitDataVerifier::new(&config.bot_token, config.init_data_max_age_seconds);
    if let Some(skew) = config.init_data_max_future_skew_seconds {
        verifier = verifier.with_max_future_skew(skew);
    }

    AppState {
        db,
        verifier: Arc::new(verifier),
        sessions: Arc::new(JwtSessions::new(
            &config.jwt_secret,
            config.session_ttl_seconds,
        )),
        dev_user_id: config.dev_user_id.clone(),
    }
}

// Serve the HTTP routes on an already-bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), StartupError> {
    axum::serve(listener, app(state)).await?;
    Ok(())
}

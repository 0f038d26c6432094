use std::{panic, process, sync::Arc, time::Duration};

use axum::{Router, error_handling::HandleErrorLayer, routing::get};
use sqlx::postgres::PgPoolOptions;
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::repos::pg_user_store::PgUserStore;
use crate::repos::user_store::UserStore;
use crate::services::auth::TokenService;
use crate::services::auth::jwt::TokenCodec;
use crate::services::auth::keys::KeyMaterial;
use crate::services::auth::provider::ProviderClient;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice
        // immediately. In production, prefer the default behavior (stderr)
        // and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting identity provider in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|_| AppError::Internal)?;
    axum::serve(listener, app)
        .await
        .map_err(|_| AppError::Internal)?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    // Key material is loaded once and shared; a malformed key or an
    // algorithm/key mismatch means the process cannot serve auth endpoints.
    let keys = KeyMaterial::new(
        config.algorithm,
        &config.jwt_private_key_pem,
        config.jwt_public_key_pem.as_deref(),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to load signing key material");
        AppError::Internal
    })?;
    let keys = Arc::new(keys);

    let codec = TokenCodec::new(keys.clone(), config.issuer.clone(), config.audience.clone());
    let tokens = Arc::new(TokenService::new(codec, config.token_ttl_seconds));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to connect to database");
            AppError::Internal
        })?;
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));

    Ok(AppState::new(
        Arc::new(config.clone()),
        keys,
        tokens,
        ProviderClient::new(),
        users,
    ))
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    // One overall deadline per request; an elapsed timeout aborts in-flight
    // provider fetches and DB calls and surfaces as 504, not 500.
    let timeout = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )));

    Router::new()
        .route("/health", get(health))
        .merge(api::v1::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout
    } else {
        tracing::error!(error = %err, "request middleware failure");
        AppError::Internal
    }
}

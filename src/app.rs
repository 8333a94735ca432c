/*
 * Responsibility
 * - Config読み込み → 依存生成 (store/auth/route table) → Router 組み立て
 * - Middleware の適用 (CORS / HTTP infra / Bearer access)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::v1::handlers::health::health;
use crate::api::v1::routes::{self, Route, RouteScopes};
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::repos::PgUserStore;
use crate::services::auth::build_auth_service;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,user_manager_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    tracing::info!(
        "starting user-manager API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgUserStore::new(db));

    let auth = build_auth_service(&config).await?;

    // The route table is built once here and immutable afterwards; the same
    // records drive both routing and the per-route scope checks.
    let table = routes::table(&config.auth_resource_server_id);
    let route_scopes = Arc::new(RouteScopes::new(routes::V1_PREFIX, &table));

    let state = AppState::new(store, auth, route_scopes);

    let app = build_router(table, state);
    let app = middleware::cors::apply(app, &config);
    let app = middleware::http::apply(app);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assemble the service router: `/health` open, v1 routes behind the access
/// middleware. Shared with the integration tests so they exercise the real
/// wiring.
pub fn build_router(table: Vec<Route>, state: AppState) -> Router {
    // Unmatched paths get the structured 404 body, same as absent resources.
    async fn fallback() -> AppError {
        AppError::not_found("route")
    }

    let v1 = middleware::auth::access::apply(routes::router(table), state.clone());

    Router::new()
        .route("/health", get(health))
        .nest(routes::V1_PREFIX, v1)
        .fallback(fallback)
        .with_state(state)
}

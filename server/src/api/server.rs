use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::jwt::JwtManager;
use super::middleware::auth_middleware;
use super::{entries, leaderboards};
use crate::entry_service::EntryService;
use crate::leaderboard_service::LeaderboardService;

#[derive(Clone)]
pub struct AppState {
    pub entries: EntryService,
    pub leaderboards: LeaderboardService,
}

pub fn build_router(state: AppState, jwt_manager: Arc<JwtManager>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/api/leaderboards",
            get(leaderboards::list)
                .post(leaderboards::create)
                .put(leaderboards::update),
        )
        .route("/api/leaderboards/:id", axum::routing::delete(leaderboards::delete))
        .route("/api/leaderboards/:id/info", get(leaderboards::get))
        .route("/api/leaderboards/entries", post(entries::submit))
        .route(
            "/api/leaderboards/entries/:id",
            get(entries::get_by_id).delete(entries::delete),
        )
        .route(
            "/api/leaderboards/:id/entries/:player_id",
            get(entries::get_by_player),
        )
        .route("/api/leaderboards/:id/top", get(entries::get_top))
        .route(
            "/api/leaderboards/:id/ranks/:player_id",
            get(entries::get_rank),
        )
        .layer(middleware::from_fn_with_state(jwt_manager, auth_middleware));

    Router::new()
        .route("/api/health", get(health_check))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_api_server<F>(
    addr: &str,
    state: AppState,
    jwt_manager: Arc<JwtManager>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, jwt_manager);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))
}

async fn health_check() -> &'static str {
    "OK"
}

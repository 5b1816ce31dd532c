use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use common::{Leaderboard, LeaderboardId, LeaderboardRecord};

use super::entries::actor_of;
use super::error::AppError;
use super::server::AppState;
use crate::actor::Actor;

pub async fn list(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> Result<Json<Vec<Leaderboard>>, AppError> {
    Ok(Json(state.leaderboards.list(actor_of(&actor)).await?))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Json(record): Json<LeaderboardRecord>,
) -> Result<(StatusCode, Json<Leaderboard>), AppError> {
    let created = state.leaderboards.create(actor_of(&actor), record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Json(record): Json<LeaderboardRecord>,
) -> Result<Json<Leaderboard>, AppError> {
    Ok(Json(state.leaderboards.update(actor_of(&actor), record).await?))
}

pub async fn get(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Path(id): Path<LeaderboardId>,
) -> Result<Json<Leaderboard>, AppError> {
    Ok(Json(state.leaderboards.get(actor_of(&actor), id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Path(id): Path<LeaderboardId>,
) -> Result<StatusCode, AppError> {
    state.leaderboards.delete(actor_of(&actor), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

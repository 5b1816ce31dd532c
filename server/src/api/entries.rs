use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use common::{EntryId, EntrySnapshot, EntryView, LeaderboardId, PlayerId, Rank, Score};

use super::error::AppError;
use super::server::AppState;
use crate::actor::Actor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub leaderboard_id: LeaderboardId,
    pub score: Score,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: EntryId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankResponse {
    pub rank: Rank,
}

pub(super) fn actor_of(actor: &Option<Extension<Actor>>) -> Option<&Actor> {
    actor.as_ref().map(|Extension(actor)| actor)
}

pub async fn submit(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let id = state
        .entries
        .submit(actor_of(&actor), request.leaderboard_id, request.score)
        .await?;
    Ok(Json(SubmitResponse { id }))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
) -> Result<Json<EntryView>, AppError> {
    Ok(Json(state.entries.get_by_id(entry_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Path(entry_id): Path<EntryId>,
) -> Result<StatusCode, AppError> {
    state.entries.delete(actor_of(&actor), entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_by_player(
    State(state): State<AppState>,
    Path((leaderboard_id, player_id)): Path<(LeaderboardId, PlayerId)>,
) -> Result<Json<EntryView>, AppError> {
    Ok(Json(
        state.entries.get_by_player(player_id, leaderboard_id).await?,
    ))
}

pub async fn get_top(
    State(state): State<AppState>,
    Path(leaderboard_id): Path<LeaderboardId>,
) -> Result<Json<Vec<EntrySnapshot>>, AppError> {
    Ok(Json(state.entries.get_top_n_by_id(leaderboard_id).await?))
}

pub async fn get_rank(
    State(state): State<AppState>,
    Path((leaderboard_id, player_id)): Path<(LeaderboardId, PlayerId)>,
) -> Result<Json<RankResponse>, AppError> {
    let rank = state.entries.get_rank(leaderboard_id, player_id).await?;
    Ok(Json(RankResponse { rank }))
}

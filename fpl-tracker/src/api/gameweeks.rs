//! Gameweek leaderboard and latest-gameweek endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use fpl_common::RankedEntry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parse_positive;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for `/history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub gameweek: Option<String>,
}

/// `/latest_gameweek` body
#[derive(Debug, Serialize)]
pub struct LatestGameweekResponse {
    pub latest_gameweek: u32,
}

/// GET /history?gameweek=N
///
/// Tracked teams that have a record for gameweek N, ranked by season total.
/// Teams whose fetch fails are silently absent.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<RankedEntry>>> {
    let gameweek = parse_positive("gameweek", query.gameweek.as_deref())?;
    let gameweek = u32::try_from(gameweek)
        .map_err(|_| ApiError::BadRequest("invalid gameweek".to_string()))?;

    debug!(gameweek, "Building gameweek leaderboard");
    let board = state.tracker.gameweek_leaderboard(gameweek).await?;
    Ok(Json(board))
}

/// GET /latest_gameweek
pub async fn get_latest_gameweek(State(state): State<AppState>) -> Json<LatestGameweekResponse> {
    Json(LatestGameweekResponse {
        latest_gameweek: state.tracker.latest_gameweek().await,
    })
}

/// Build gameweek routes
pub fn gameweek_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(get_history))
        .route("/latest_gameweek", get(get_latest_gameweek))
}

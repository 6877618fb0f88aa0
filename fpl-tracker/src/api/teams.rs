//! Single-team history endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use fpl_common::Gameweek;
use serde::Deserialize;

use super::parse_positive;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TeamHistoryQuery {
    pub team_id: Option<String>,
}

/// GET /team_history?team_id=N
pub async fn get_team_history(
    State(state): State<AppState>,
    Query(query): Query<TeamHistoryQuery>,
) -> ApiResult<Json<Vec<Gameweek>>> {
    let team_id = parse_positive("team_id", query.team_id.as_deref())?;
    let history = state.tracker.team_history(team_id).await?;
    Ok(Json(history))
}

/// Build team routes
pub fn team_routes() -> Router<AppState> {
    Router::new().route("/team_history", get(get_team_history))
}

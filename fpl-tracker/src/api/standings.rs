//! League standings endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::parse_positive;
use crate::error::{ApiError, ApiResult};
use crate::tracker::StandingsResponse;
use crate::AppState;

/// Query parameters for `/standings`
#[derive(Debug, Deserialize)]
pub struct StandingsQuery {
    #[serde(rename = "leagueId")]
    pub league_id: Option<String>,
}

/// GET /standings?leagueId=N
///
/// Falls back to the configured league when `leagueId` is absent.
pub async fn get_standings(
    State(state): State<AppState>,
    Query(query): Query<StandingsQuery>,
) -> ApiResult<Json<StandingsResponse>> {
    let league_id = match query.league_id.as_deref() {
        Some(raw) => parse_positive("leagueId", Some(raw))?,
        None => state
            .tracker
            .default_league()
            .ok_or_else(|| ApiError::BadRequest("leagueId is required".to_string()))?,
    };

    let standings = state.tracker.standings(league_id).await?;
    Ok(Json(standings))
}

/// Build standings routes
pub fn standings_routes() -> Router<AppState> {
    Router::new().route("/standings", get(get_standings))
}

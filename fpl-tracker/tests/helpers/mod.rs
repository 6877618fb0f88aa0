//! Shared test helpers for fpl-tracker integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use fpl_common::config::ServiceConfig;
use fpl_common::{Gameweek, League, Manager, TeamId};
use fpl_tracker::upstream::{FetchError, FplSource};
use fpl_tracker::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory FPL source; unknown teams and leagues fail with 404
#[derive(Default)]
pub struct StubSource {
    histories: HashMap<TeamId, Vec<Gameweek>>,
    leagues: HashMap<u64, League>,
    pub history_calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team from `(gameweek, points, total_points)` tuples
    pub fn team(mut self, team_id: TeamId, rows: &[(u32, i32, i32)]) -> Self {
        let history = rows
            .iter()
            .map(|&(gameweek, points, total_points)| Gameweek {
                team_id,
                gameweek,
                points,
                total_points,
            })
            .collect();
        self.histories.insert(team_id, history);
        self
    }

    pub fn league(mut self, league_id: u64, name: &str, team_ids: &[TeamId]) -> Self {
        let managers = team_ids
            .iter()
            .map(|&team_id| Manager {
                team_id,
                player_name: format!("Manager {}", team_id),
                entry_name: format!("Team {}", team_id),
            })
            .collect();
        self.leagues.insert(
            league_id,
            League {
                name: name.to_string(),
                managers,
            },
        );
        self
    }
}

#[async_trait]
impl FplSource for StubSource {
    async fn history(&self, team_id: TeamId) -> Result<Vec<Gameweek>, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.histories
            .get(&team_id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn league(&self, league_id: u64) -> Result<League, FetchError> {
        self.leagues
            .get(&league_id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// Teams A=1, B=2 and C=3 where C's fetch always fails
pub fn scenario_source() -> StubSource {
    StubSource::new()
        .team(1, &[(1, 10, 10), (2, 5, 15)])
        .team(2, &[(1, 8, 8)])
}

pub fn config_with_teams(team_ids: &[TeamId]) -> ServiceConfig {
    ServiceConfig {
        team_ids: team_ids.to_vec(),
        ..Default::default()
    }
}

pub fn app(source: StubSource, config: &ServiceConfig) -> axum::Router {
    build_router(AppState::with_source(Arc::new(source), config))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Extract JSON body from response
pub async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

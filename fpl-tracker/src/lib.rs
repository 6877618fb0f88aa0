//! fpl-tracker library interface
//!
//! Fetches league standings and team histories from the FPL API and
//! republishes aggregated views over HTTP. Exposed as a library for
//! integration testing.

pub mod aggregator;
pub mod api;
pub mod error;
pub mod ranking;
pub mod tracker;
pub mod upstream;

pub use crate::error::{ApiError, ApiResult};

use aggregator::FanOut;
use axum::Router;
use chrono::{DateTime, Utc};
use fpl_common::config::ServiceConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracker::{TeamSet, Tracker};
use upstream::{FetchError, FplClient, FplSource};

/// Application state shared across handlers
///
/// Immutable after startup; per-request data never lands here.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Directory served for unmatched routes, if any
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            startup_time: Utc::now(),
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Wire an arbitrary source with the configured fan-out limits
    pub fn with_source(source: Arc<dyn FplSource>, config: &ServiceConfig) -> Self {
        let fan_out = FanOut::new(
            source,
            config.upstream.max_concurrent_fetches,
            config.upstream.timeout(),
        );
        let teams = TeamSet::from_config(&config.team_ids, config.league_id);
        Self::new(Tracker::new(fan_out, teams, config.league_id))
    }

    /// Production wiring: HTTP client against the configured API root
    pub fn from_config(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = FplClient::new(&config.upstream)?;
        Ok(Self::with_source(Arc::new(client), config).with_static_dir(&config.static_dir))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .merge(api::standings_routes())
        .merge(api::gameweek_routes())
        .merge(api::team_routes())
        .merge(api::health_routes())
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

//! Upstream FPL API access
//!
//! [`FplSource`] is the seam between the tracker and the third-party API.
//! [`FplClient`] implements it over HTTP; tests substitute in-memory sources.

mod client;
mod response;

pub use client::{decode_history, decode_league, FplClient};

use async_trait::async_trait;
use fpl_common::{Gameweek, League, TeamId};
use std::time::Duration;
use thiserror::Error;

/// Upstream fetch errors
///
/// Callers treat every variant the same way: the data is unavailable for
/// this request. The variants exist for logging.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Request(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),
}

/// Source of league standings and per-team gameweek history
#[async_trait]
pub trait FplSource: Send + Sync {
    /// Full gameweek history of one team, in upstream order
    async fn history(&self, team_id: TeamId) -> Result<Vec<Gameweek>, FetchError>;

    /// League name and managers of a classic league
    async fn league(&self, league_id: u64) -> Result<League, FetchError>;
}

// ============================================================================
// Mock Source for Testing
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory source; teams without an entry fail with a 404 status
    #[derive(Default)]
    pub struct MockSource {
        histories: HashMap<TeamId, Vec<Gameweek>>,
        leagues: HashMap<u64, League>,
        delays: HashMap<TeamId, Duration>,
        panics: Vec<TeamId>,
        in_flight: AtomicUsize,
        pub peak_in_flight: Arc<AtomicUsize>,
        pub calls: AtomicUsize,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a team from `(gameweek, points, total_points)` tuples
        pub fn with_team(mut self, team_id: TeamId, rows: &[(u32, i32, i32)]) -> Self {
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

        pub fn with_league(mut self, league_id: u64, league: League) -> Self {
            self.leagues.insert(league_id, league);
            self
        }

        pub fn with_delay(mut self, team_id: TeamId, delay: Duration) -> Self {
            self.delays.insert(team_id, delay);
            self
        }

        pub fn with_panic(mut self, team_id: TeamId) -> Self {
            self.panics.push(team_id);
            self
        }
    }

    #[async_trait]
    impl FplSource for MockSource {
        async fn history(&self, team_id: TeamId) -> Result<Vec<Gameweek>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays
                .get(&team_id)
                .copied()
                .unwrap_or(Duration::from_millis(5));
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panics.contains(&team_id) {
                panic!("mock source asked to panic for team {}", team_id);
            }

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
}

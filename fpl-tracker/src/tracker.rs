//! Tracker operations behind the HTTP handlers
//!
//! Every call builds its own accumulator through [`FanOut::aggregate`] and
//! returns plain values; nothing fetched outlives the request.

use crate::aggregator::FanOut;
use crate::error::{ApiError, ApiResult};
use crate::ranking::{
    leaderboard, latest_gameweek, sort_standings, GameweekPairReducer, LatestGameweekReducer,
    StandingsReducer,
};
use fpl_common::{Gameweek, RankedEntry, TeamDetails, TeamId};
use serde::Serialize;
use tracing::{info, warn};

/// `GET /standings` body
#[derive(Debug, Clone, Serialize)]
pub struct StandingsResponse {
    pub league_name: String,
    pub results: Vec<TeamDetails>,
}

/// Which teams `/history` and `/latest_gameweek` cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamSet {
    /// Configured team ids, re-fetched on every request
    Fixed(Vec<TeamId>),
    /// Managers of this league, discovered on every request
    League(u64),
}

impl TeamSet {
    /// Fixed ids win; a league is only used when no ids are configured
    pub fn from_config(team_ids: &[TeamId], league_id: Option<u64>) -> Self {
        match league_id {
            Some(league_id) if team_ids.is_empty() => TeamSet::League(league_id),
            _ => TeamSet::Fixed(team_ids.to_vec()),
        }
    }
}

/// Tracker service
#[derive(Clone)]
pub struct Tracker {
    fan_out: FanOut,
    teams: TeamSet,
    default_league: Option<u64>,
}

impl Tracker {
    pub fn new(fan_out: FanOut, teams: TeamSet, default_league: Option<u64>) -> Self {
        Self {
            fan_out,
            teams,
            default_league,
        }
    }

    pub fn teams(&self) -> &TeamSet {
        &self.teams
    }

    pub fn default_league(&self) -> Option<u64> {
        self.default_league
    }

    /// League name and every manager's full history
    ///
    /// A failed league fetch fails the request; managers whose history
    /// cannot be fetched are left out.
    pub async fn standings(&self, league_id: u64) -> ApiResult<StandingsResponse> {
        let league = self.fan_out.source().league(league_id).await.map_err(|e| {
            warn!(league_id, error = %e, "League fetch failed");
            ApiError::Upstream(e)
        })?;

        let team_ids = league.team_ids();
        let aggregation = self
            .fan_out
            .aggregate(&team_ids, StandingsReducer::new(&league.managers))
            .await;

        let mut results = aggregation.contributions;
        sort_standings(&mut results);

        info!(
            league_id,
            managers = team_ids.len(),
            returned = results.len(),
            "Standings assembled"
        );

        Ok(StandingsResponse {
            league_name: league.name,
            results,
        })
    }

    /// Leaderboard of tracked teams at one gameweek
    pub async fn gameweek_leaderboard(&self, gameweek: u32) -> ApiResult<Vec<RankedEntry>> {
        let team_ids = self.resolve_teams().await?;
        let aggregation = self
            .fan_out
            .aggregate(&team_ids, GameweekPairReducer { gameweek })
            .await;

        Ok(leaderboard(aggregation.contributions))
    }

    /// Highest gameweek any tracked team has reached, `0` if none
    ///
    /// Never fails: an unresolvable team set counts as empty.
    pub async fn latest_gameweek(&self) -> u32 {
        let team_ids = match self.resolve_teams().await {
            Ok(team_ids) => team_ids,
            Err(e) => {
                warn!(error = %e, "Could not resolve tracked teams, reporting gameweek 0");
                return 0;
            }
        };

        let aggregation = self.fan_out.aggregate(&team_ids, LatestGameweekReducer).await;
        latest_gameweek(&aggregation.contributions)
    }

    /// One team's full history, no fan-out
    pub async fn team_history(&self, team_id: TeamId) -> ApiResult<Vec<Gameweek>> {
        self.fan_out.source().history(team_id).await.map_err(|e| {
            warn!(team_id, error = %e, "Team history fetch failed");
            ApiError::Upstream(e)
        })
    }

    async fn resolve_teams(&self) -> ApiResult<Vec<TeamId>> {
        match &self.teams {
            TeamSet::Fixed(team_ids) => Ok(team_ids.clone()),
            TeamSet::League(league_id) => {
                let league = self
                    .fan_out
                    .source()
                    .league(*league_id)
                    .await
                    .map_err(ApiError::Upstream)?;
                Ok(league.team_ids())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::mock::MockSource;
    use fpl_common::{League, Manager};
    use std::sync::Arc;
    use std::time::Duration;

    /// A: [(1,10,10),(2,5,15)], B: [(1,8,8)], C: unknown to the source
    fn scenario_source() -> MockSource {
        MockSource::new()
            .with_team(1, &[(1, 10, 10), (2, 5, 15)])
            .with_team(2, &[(1, 8, 8)])
    }

    fn build_tracker(source: MockSource, teams: TeamSet) -> Tracker {
        let fan_out = FanOut::new(Arc::new(source), 4, Duration::from_secs(2));
        Tracker::new(fan_out, teams, None)
    }

    fn league() -> League {
        League {
            name: "Office League".to_string(),
            managers: vec![
                Manager {
                    team_id: 1,
                    player_name: "Ana".to_string(),
                    entry_name: "Ana United".to_string(),
                },
                Manager {
                    team_id: 2,
                    player_name: "Ben".to_string(),
                    entry_name: "Ben City".to_string(),
                },
                Manager {
                    team_id: 3,
                    player_name: "Cy".to_string(),
                    entry_name: "Cy Rovers".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_leaderboard_scenario() {
        let tracker = build_tracker(scenario_source(), TeamSet::Fixed(vec![1, 2, 3]));

        let board = tracker.gameweek_leaderboard(2).await.unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].team_id, 1);
        assert_eq!(board[0].gameweek, 2);
        assert_eq!(board[0].total_points, 15);
        assert_eq!(board[0].rank, 1);
    }

    #[tokio::test]
    async fn test_latest_gameweek_scenario() {
        let tracker = build_tracker(scenario_source(), TeamSet::Fixed(vec![1, 2, 3]));
        assert_eq!(tracker.latest_gameweek().await, 2);
    }

    #[tokio::test]
    async fn test_empty_team_set() {
        let tracker = build_tracker(scenario_source(), TeamSet::Fixed(Vec::new()));

        assert!(tracker.gameweek_leaderboard(1).await.unwrap().is_empty());
        assert_eq!(tracker.latest_gameweek().await, 0);
    }

    #[tokio::test]
    async fn test_all_fetches_fail() {
        let tracker = build_tracker(MockSource::new(), TeamSet::Fixed(vec![7, 8]));

        assert!(tracker.gameweek_leaderboard(1).await.unwrap().is_empty());
        assert_eq!(tracker.latest_gameweek().await, 0);
    }

    #[tokio::test]
    async fn test_league_discovery() {
        let source = scenario_source().with_league(50, league());
        let tracker = build_tracker(source, TeamSet::League(50));

        let board = tracker.gameweek_leaderboard(1).await.unwrap();
        let teams: Vec<TeamId> = board.iter().map(|e| e.team_id).collect();
        assert_eq!(teams, vec![1, 2]);
        assert_eq!(tracker.latest_gameweek().await, 2);
    }

    #[tokio::test]
    async fn test_league_discovery_failure() {
        let tracker = build_tracker(scenario_source(), TeamSet::League(404));

        assert!(matches!(
            tracker.gameweek_leaderboard(1).await,
            Err(ApiError::Upstream(_))
        ));
        assert_eq!(tracker.latest_gameweek().await, 0);
    }

    #[tokio::test]
    async fn test_standings_drop_failed_managers() {
        let source = scenario_source().with_league(50, league());
        let tracker = build_tracker(source, TeamSet::Fixed(Vec::new()));

        let standings = tracker.standings(50).await.unwrap();

        assert_eq!(standings.league_name, "Office League");
        let teams: Vec<TeamId> = standings.results.iter().map(|r| r.team_id).collect();
        // Ana (15) ahead of Ben (8); Cy's history fetch fails
        assert_eq!(teams, vec![1, 2]);
        assert_eq!(standings.results[0].player_name, "Ana");
    }

    #[tokio::test]
    async fn test_standings_unknown_league() {
        let tracker = build_tracker(scenario_source(), TeamSet::Fixed(Vec::new()));
        assert!(matches!(tracker.standings(9).await, Err(ApiError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_team_history_passthrough() {
        let tracker = build_tracker(scenario_source(), TeamSet::Fixed(Vec::new()));

        let history = tracker.team_history(1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].total_points, 15);

        assert!(matches!(tracker.team_history(3).await, Err(ApiError::Upstream(_))));
    }

    #[test]
    fn test_team_set_from_config() {
        assert_eq!(TeamSet::from_config(&[1, 2], Some(9)), TeamSet::Fixed(vec![1, 2]));
        assert_eq!(TeamSet::from_config(&[], Some(9)), TeamSet::League(9));
        assert_eq!(TeamSet::from_config(&[], None), TeamSet::Fixed(Vec::new()));
    }
}

//! Raw response shapes of the FPL API
//!
//! Only the fields the tracker reads are declared; serde ignores the rest.

use fpl_common::{Gameweek, League, Manager, TeamId};
use serde::Deserialize;

/// `GET /entry/{id}/history/`
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub current: Vec<HistoryEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryEvent {
    pub event: u32,
    pub points: i32,
    pub total_points: i32,
}

impl HistoryResponse {
    pub fn into_gameweeks(self, team_id: TeamId) -> Vec<Gameweek> {
        self.current
            .into_iter()
            .map(|event| Gameweek {
                team_id,
                gameweek: event.event,
                points: event.points,
                total_points: event.total_points,
            })
            .collect()
    }
}

/// `GET /leagues-classic/{id}/standings/`
#[derive(Debug, Deserialize)]
pub(crate) struct StandingsResponse {
    pub league: LeagueInfo,
    #[serde(default)]
    pub standings: StandingsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeagueInfo {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StandingsPage {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub results: Vec<StandingsRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StandingsRow {
    /// Team id; the row's own `id` is a standings row id
    pub entry: TeamId,
    pub player_name: String,
    pub entry_name: String,
}

impl StandingsResponse {
    pub fn into_league(self) -> League {
        League {
            name: self.league.name,
            managers: self
                .standings
                .results
                .into_iter()
                .map(|row| Manager {
                    team_id: row.entry,
                    player_name: row.player_name,
                    entry_name: row.entry_name,
                })
                .collect(),
        }
    }
}

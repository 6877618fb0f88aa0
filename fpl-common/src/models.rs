//! Domain models shared between the upstream client and the HTTP API
//!
//! Field names on the wire follow the browser client that consumes
//! `/standings` and `/history` (`TeamID`, `TotalPoints`, ...). Envelopes
//! around these types are snake_case and live with the handlers.

use serde::{Deserialize, Serialize};

/// Upstream entry id of one manager's team
pub type TeamId = u64;

/// One team's score at one gameweek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Gameweek {
    #[serde(rename = "TeamID")]
    pub team_id: TeamId,
    /// Gameweek number (1-based)
    pub gameweek: u32,
    /// Points scored in this gameweek (negative after transfer hits)
    pub points: i32,
    /// Season total after this gameweek
    pub total_points: i32,
}

/// A gameweek record with its leaderboard position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RankedEntry {
    #[serde(rename = "TeamID")]
    pub team_id: TeamId,
    pub gameweek: u32,
    pub points: i32,
    pub total_points: i32,
    /// 1-based position by season total
    pub rank: u32,
    /// Position in the previous gameweek's leaderboard, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,
    /// Set on every entry that shares the lowest gameweek score
    #[serde(default)]
    pub lowest_points: bool,
}

impl RankedEntry {
    pub fn new(record: Gameweek, rank: u32) -> Self {
        Self {
            team_id: record.team_id,
            gameweek: record.gameweek,
            points: record.points,
            total_points: record.total_points,
            rank,
            previous_rank: None,
            lowest_points: false,
        }
    }

    /// Places gained since the previous gameweek (negative when dropping)
    pub fn movement(&self) -> Option<i64> {
        self.previous_rank
            .map(|previous| i64::from(previous) - i64::from(self.rank))
    }
}

/// Manager listed in a classic league's standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub team_id: TeamId,
    pub player_name: String,
    pub entry_name: String,
}

/// Classic league with its managers, in upstream standings order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub managers: Vec<Manager>,
}

impl League {
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.managers.iter().map(|m| m.team_id).collect()
    }
}

/// Standings row: a manager and their full gameweek history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeamDetails {
    #[serde(rename = "TeamID")]
    pub team_id: TeamId,
    pub player_name: String,
    pub entry_name: String,
    pub history: Vec<Gameweek>,
}

impl TeamDetails {
    pub fn new(manager: &Manager, history: Vec<Gameweek>) -> Self {
        Self {
            team_id: manager.team_id,
            player_name: manager.player_name.clone(),
            entry_name: manager.entry_name.clone(),
            history,
        }
    }

    /// Season total at the most recent gameweek in the history
    pub fn latest_total(&self) -> Option<i32> {
        self.history
            .iter()
            .max_by_key(|gw| gw.gameweek)
            .map(|gw| gw.total_points)
    }
}

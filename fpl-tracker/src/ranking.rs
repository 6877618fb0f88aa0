//! Reducers and ranking policies applied to fan-out results
//!
//! Ordering rule for every leaderboard: `total_points` descending, then
//! team id ascending. Ranks are sorted positions, so they always form
//! `1..=N` with no gaps even when totals tie.

use crate::aggregator::Reducer;
use fpl_common::{Gameweek, Manager, RankedEntry, TeamDetails, TeamId};
use std::collections::HashMap;

/// Contributes the record for exactly one gameweek, if the team has it
#[derive(Debug, Clone, Copy)]
pub struct GameweekReducer {
    pub gameweek: u32,
}

impl Reducer for GameweekReducer {
    type Output = Gameweek;

    fn reduce(&self, _team_id: TeamId, history: &[Gameweek]) -> Option<Gameweek> {
        history.iter().find(|gw| gw.gameweek == self.gameweek).copied()
    }
}

/// Gameweek record paired with the team's record one week earlier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameweekPair {
    pub current: Gameweek,
    pub previous: Option<Gameweek>,
}

/// Like [`GameweekReducer`], also carrying the previous week for rank movement
#[derive(Debug, Clone, Copy)]
pub struct GameweekPairReducer {
    pub gameweek: u32,
}

impl Reducer for GameweekPairReducer {
    type Output = GameweekPair;

    fn reduce(&self, team_id: TeamId, history: &[Gameweek]) -> Option<GameweekPair> {
        let current = GameweekReducer {
            gameweek: self.gameweek,
        }
        .reduce(team_id, history)?;

        let previous = self.gameweek.checked_sub(1).and_then(|gameweek| {
            GameweekReducer { gameweek }.reduce(team_id, history)
        });

        Some(GameweekPair { current, previous })
    }
}

/// Contributes the highest gameweek a team has a record for
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestGameweekReducer;

impl Reducer for LatestGameweekReducer {
    type Output = u32;

    fn reduce(&self, _team_id: TeamId, history: &[Gameweek]) -> Option<u32> {
        history.iter().map(|gw| gw.gameweek).max()
    }
}

/// Pairs each known manager with their fetched history
#[derive(Debug, Clone, Default)]
pub struct StandingsReducer {
    managers: HashMap<TeamId, Manager>,
}

impl StandingsReducer {
    pub fn new(managers: &[Manager]) -> Self {
        Self {
            managers: managers.iter().map(|m| (m.team_id, m.clone())).collect(),
        }
    }
}

impl Reducer for StandingsReducer {
    type Output = TeamDetails;

    fn reduce(&self, team_id: TeamId, history: &[Gameweek]) -> Option<TeamDetails> {
        self.managers
            .get(&team_id)
            .map(|manager| TeamDetails::new(manager, history.to_vec()))
    }
}

/// Sort by season total and assign 1-based ranks
pub fn rank_entries(mut entries: Vec<Gameweek>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.team_id.cmp(&b.team_id))
    });

    entries
        .into_iter()
        .zip(1u32..)
        .map(|(record, rank)| RankedEntry::new(record, rank))
        .collect()
}

/// Ranked leaderboard with previous-week ranks and lowest scorers marked
///
/// Previous ranks are computed over the same teams, restricted to those
/// that also have a record for the previous week.
pub fn leaderboard(pairs: Vec<GameweekPair>) -> Vec<RankedEntry> {
    let previous_ranks: HashMap<TeamId, u32> =
        rank_entries(pairs.iter().filter_map(|pair| pair.previous).collect())
            .into_iter()
            .map(|entry| (entry.team_id, entry.rank))
            .collect();

    let mut ranked = rank_entries(pairs.into_iter().map(|pair| pair.current).collect());

    let lowest = ranked.iter().map(|entry| entry.points).min();
    for entry in &mut ranked {
        entry.previous_rank = previous_ranks.get(&entry.team_id).copied();
        entry.lowest_points = Some(entry.points) == lowest;
    }

    ranked
}

/// Highest gameweek across all contributions, `0` when there are none
pub fn latest_gameweek(contributions: &[u32]) -> u32 {
    contributions.iter().copied().max().unwrap_or(0)
}

/// Order standings rows by latest season total, then team id
pub fn sort_standings(rows: &mut [TeamDetails]) {
    rows.sort_by(|a, b| {
        b.latest_total()
            .cmp(&a.latest_total())
            .then(a.team_id.cmp(&b.team_id))
    });
}

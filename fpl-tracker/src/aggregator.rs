//! Concurrent fan-out over tracked teams
//!
//! One task per distinct team id fetches that team's history, applies a
//! [`Reducer`], and appends a tagged [`FetchOutcome`] to a request-scoped
//! accumulator. A semaphore caps in-flight upstream requests and every
//! fetch runs under a deadline. `aggregate` returns only after every task
//! has joined.
//!
//! Per-team error isolation: a failed, timed-out or panicking fetch drops
//! that team from the result and never fails the aggregate.

use crate::upstream::{FetchError, FplSource};
use fpl_common::{Gameweek, TeamId};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Maps one team's fetched history to zero or one contribution
pub trait Reducer: Send + Sync + 'static {
    type Output: Send + 'static;

    fn reduce(&self, team_id: TeamId, history: &[Gameweek]) -> Option<Self::Output>;
}

/// What one team's task reported
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Contributed(T),
    /// Fetched, but the reducer had nothing to contribute
    NoContribution,
    Failed(FetchError),
}

/// Merged result of one fan-out
#[derive(Debug)]
pub struct Aggregation<T> {
    /// Contributions in completion order (not deterministic)
    pub contributions: Vec<T>,
    /// Teams fetched successfully that contributed nothing
    pub skipped: Vec<TeamId>,
    /// Teams whose fetch failed, timed out or panicked
    pub failures: Vec<(TeamId, FetchError)>,
}

impl<T> Aggregation<T> {
    fn from_outcomes(outcomes: Vec<(TeamId, FetchOutcome<T>)>) -> Self {
        let mut aggregation = Self {
            contributions: Vec::with_capacity(outcomes.len()),
            skipped: Vec::new(),
            failures: Vec::new(),
        };
        for (team_id, outcome) in outcomes {
            match outcome {
                FetchOutcome::Contributed(value) => aggregation.contributions.push(value),
                FetchOutcome::NoContribution => aggregation.skipped.push(team_id),
                FetchOutcome::Failed(error) => aggregation.failures.push((team_id, error)),
            }
        }
        aggregation.skipped.sort_unstable();
        aggregation.failures.sort_by_key(|(team_id, _)| *team_id);
        aggregation
    }

    /// Teams that ended up absent from `contributions`
    pub fn dropped(&self) -> usize {
        self.skipped.len() + self.failures.len()
    }

    pub fn failed_teams(&self) -> Vec<TeamId> {
        self.failures.iter().map(|(team_id, _)| *team_id).collect()
    }
}

/// Request-scoped accumulator shared by the tasks of one fan-out
type Accumulator<T> = Arc<Mutex<Vec<(TeamId, FetchOutcome<T>)>>>;

/// Fan-out executor
#[derive(Clone)]
pub struct FanOut {
    source: Arc<dyn FplSource>,
    max_concurrent: usize,
    fetch_timeout: Duration,
}

impl FanOut {
    /// `max_concurrent` is clamped to at least one
    pub fn new(source: Arc<dyn FplSource>, max_concurrent: usize, fetch_timeout: Duration) -> Self {
        Self {
            source,
            max_concurrent: max_concurrent.max(1),
            fetch_timeout,
        }
    }

    pub fn source(&self) -> &Arc<dyn FplSource> {
        &self.source
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetch every team concurrently and merge the reducer's contributions
    ///
    /// Duplicate ids are fetched once.
    pub async fn aggregate<R: Reducer>(&self, team_ids: &[TeamId], reducer: R) -> Aggregation<R::Output> {
        let requested: BTreeSet<TeamId> = team_ids.iter().copied().collect();
        let reducer = Arc::new(reducer);
        let gate = Arc::new(Semaphore::new(self.max_concurrent));
        let accumulator: Accumulator<R::Output> =
            Arc::new(Mutex::new(Vec::with_capacity(requested.len())));

        let mut tasks = JoinSet::new();
        for &team_id in &requested {
            let source = Arc::clone(&self.source);
            let reducer = Arc::clone(&reducer);
            let gate = Arc::clone(&gate);
            let accumulator = Arc::clone(&accumulator);
            let fetch_timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let outcome = match fetch_gated(source.as_ref(), &gate, team_id, fetch_timeout).await {
                    Ok(history) => match reducer.reduce(team_id, &history) {
                        Some(value) => FetchOutcome::Contributed(value),
                        None => FetchOutcome::NoContribution,
                    },
                    Err(error) => {
                        warn!(team_id, error = %error, "Fetch failed, dropping team from aggregate");
                        FetchOutcome::Failed(error)
                    }
                };

                accumulator.lock().await.push((team_id, outcome));
            });
        }

        // Join barrier: every spawned task finishes before the result is read
        let mut panicked = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                panicked.push(e.to_string());
            }
        }

        let mut outcomes = std::mem::take(&mut *accumulator.lock().await);

        // A panicking task never reaches its push; attribute it by absence
        if !panicked.is_empty() {
            let reported: BTreeSet<TeamId> = outcomes.iter().map(|(team_id, _)| *team_id).collect();
            let mut reasons = panicked.into_iter();
            for &team_id in requested.difference(&reported) {
                let reason = reasons.next().unwrap_or_else(|| "unknown".to_string());
                warn!(team_id, reason = %reason, "Fetch task panicked, dropping team from aggregate");
                outcomes.push((team_id, FetchOutcome::Failed(FetchError::TaskPanicked(reason))));
            }
        }

        let aggregation = Aggregation::from_outcomes(outcomes);
        info!(
            requested = requested.len(),
            contributed = aggregation.contributions.len(),
            skipped = aggregation.skipped.len(),
            failed = aggregation.failures.len(),
            "Fan-out complete"
        );
        aggregation
    }
}

/// One upstream fetch under the concurrency gate and deadline
///
/// The permit is released before the reducer runs.
async fn fetch_gated(
    source: &dyn FplSource,
    gate: &Semaphore,
    team_id: TeamId,
    fetch_timeout: Duration,
) -> Result<Vec<Gameweek>, FetchError> {
    let _permit = gate
        .acquire()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    debug!(team_id, "Fetching team history");
    match tokio::time::timeout(fetch_timeout, source.history(team_id)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(fetch_timeout)),
    }
}

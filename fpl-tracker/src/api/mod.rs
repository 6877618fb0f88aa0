//! HTTP API handlers for fpl-tracker

pub mod gameweeks;
pub mod health;
pub mod standings;
pub mod teams;

pub use gameweeks::gameweek_routes;
pub use health::health_routes;
pub use standings::standings_routes;
pub use teams::team_routes;

use crate::error::{ApiError, ApiResult};

/// Parse a required, strictly positive integer query parameter
///
/// Missing or blank → "`name` is required"; anything else that is not a
/// positive integer → "invalid `name`". Both map to 400.
pub(crate) fn parse_positive(name: &str, raw: Option<&str>) -> ApiResult<u64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))?;

    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ApiError::BadRequest(format!("invalid {}", name))),
    }
}

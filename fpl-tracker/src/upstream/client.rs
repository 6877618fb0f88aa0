//! HTTP client for the FPL API

use super::response::{HistoryResponse, StandingsResponse};
use super::{FetchError, FplSource};
use async_trait::async_trait;
use fpl_common::config::UpstreamConfig;
use fpl_common::{Gameweek, League, TeamId};
use std::time::Duration;
use tracing::debug;

/// FPL API client
///
/// One GET per call, no retries. The reqwest timeout matches the
/// aggregator's per-fetch deadline so a hung connection is also bounded
/// for single-team lookups.
#[derive(Debug, Clone)]
pub struct FplClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FplClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let timeout = config.timeout();
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url = %url, "Querying FPL API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        Ok(body.to_vec())
    }

    fn request_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl FplSource for FplClient {
    async fn history(&self, team_id: TeamId) -> Result<Vec<Gameweek>, FetchError> {
        let url = format!("{}/entry/{}/history/", self.base_url, team_id);
        let body = self.get_bytes(&url).await?;
        let history = decode_history(team_id, &body)?;

        debug!(team_id, gameweeks = history.len(), "Retrieved team history");
        Ok(history)
    }

    async fn league(&self, league_id: u64) -> Result<League, FetchError> {
        let url = format!("{}/leagues-classic/{}/standings/", self.base_url, league_id);
        let body = self.get_bytes(&url).await?;
        let league = decode_league(&body)?;

        debug!(
            league_id,
            name = %league.name,
            managers = league.managers.len(),
            "Retrieved league standings"
        );
        Ok(league)
    }
}

/// Decode an `/entry/{id}/history/` body into gameweek records
pub fn decode_history(team_id: TeamId, body: &[u8]) -> Result<Vec<Gameweek>, FetchError> {
    let parsed: HistoryResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(parsed.into_gameweeks(team_id))
}

/// Decode a `/leagues-classic/{id}/standings/` body
///
/// Only the first standings page is read.
pub fn decode_league(body: &[u8]) -> Result<League, FetchError> {
    let parsed: StandingsResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if parsed.standings.has_next {
        debug!("League has further standings pages; only the first is used");
    }
    Ok(parsed.into_league())
}

//! fpl-tracker - FPL league tracker service
//!
//! Serves league standings, gameweek leaderboards and team histories
//! aggregated from the Fantasy Premier League API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fpl_common::config::{ConfigOverrides, ServiceConfig};
use fpl_common::TeamId;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpl_tracker::tracker::TeamSet;
use fpl_tracker::{build_router, AppState};

/// Command-line arguments for fpl-tracker
#[derive(Parser, Debug)]
#[command(name = "fpl-tracker")]
#[command(about = "FPL league tracker: standings and gameweek leaderboards over HTTP")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/fpl-tracker/config.toml)
    #[arg(short, long, env = "FPL_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "FPL_TRACKER_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FPL_TRACKER_PORT")]
    port: Option<u16>,

    /// Default league for /standings and team discovery
    #[arg(short, long, env = "FPL_TRACKER_LEAGUE_ID")]
    league_id: Option<u64>,

    /// Tracked team ids, comma separated
    #[arg(short, long, env = "FPL_TRACKER_TEAM_IDS", value_delimiter = ',')]
    team_ids: Option<Vec<TeamId>>,

    /// Directory of static files served for unmatched routes
    #[arg(long, env = "FPL_TRACKER_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FPL_TRACKER_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            port: self.port,
            league_id: self.league_id,
            team_ids: self.team_ids.clone(),
            static_dir: self.static_dir.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so the configured level applies
    let (mut config, source) =
        ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(args.overrides());

    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fpl_tracker={level},fpl_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting fpl-tracker v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", source);

    config.validate().context("Invalid configuration")?;

    let state = AppState::from_config(&config).context("Failed to create FPL API client")?;
    match state.tracker.teams() {
        TeamSet::Fixed(team_ids) if team_ids.is_empty() => {
            warn!("No team ids or league configured; /history and /latest_gameweek will be empty")
        }
        TeamSet::Fixed(team_ids) => info!("Tracking {} teams: {:?}", team_ids.len(), team_ids),
        TeamSet::League(league_id) => info!("Tracking managers of league {}", league_id),
    }
    info!(
        "Upstream: {} (timeout {}s, max {} concurrent fetches)",
        config.upstream.base_url, config.upstream.timeout_secs, config.upstream.max_concurrent_fetches
    );
    if !config.static_dir.exists() {
        warn!("Static directory {} does not exist", config.static_dir.display());
    }

    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

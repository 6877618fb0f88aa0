//! FplClient against a local stand-in for the FPL API

use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use fpl_common::config::UpstreamConfig;
use fpl_tracker::upstream::{FetchError, FplClient, FplSource};
use serde_json::{json, Value};
use std::time::Duration;

async fn history(Path(team_id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    match team_id {
        1 => Ok(Json(json!({
            "current": [
                { "event": 1, "points": 10, "total_points": 10, "rank": 900 },
                { "event": 2, "points": 5, "total_points": 15, "rank": 850 }
            ],
            "past": [],
            "chips": []
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn standings(Path(league_id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    match league_id {
        10 => Ok(Json(json!({
            "league": { "id": 10, "name": "Office League" },
            "standings": {
                "has_next": false,
                "page": 1,
                "results": [
                    { "entry": 1, "player_name": "Ana", "entry_name": "Ana United", "total": 15 },
                    { "entry": 2, "player_name": "Ben", "entry_name": "Ben City", "total": 8 }
                ]
            }
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn garbage() -> &'static str {
    "<html>maintenance</html>"
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "{}"
}

/// Serve a fake API on an ephemeral port, returning its base URL
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/api/entry/:team_id/history/", get(history))
        .route("/api/leagues-classic/:league_id/standings/", get(standings))
        .route("/broken/entry/:team_id/history/", get(garbage))
        .route("/slow/entry/:team_id/history/", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: String, timeout_secs: u64) -> FplClient {
    let config = UpstreamConfig {
        base_url,
        timeout_secs,
        ..Default::default()
    };
    FplClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_history_is_decoded_in_upstream_order() {
    let root = spawn_upstream().await;
    let client = client(format!("{}/api/", root), 5);

    let history = client.history(1).await.unwrap();

    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|gw| gw.team_id == 1));
    assert_eq!(history[0].gameweek, 1);
    assert_eq!(history[1].gameweek, 2);
    assert_eq!(history[1].points, 5);
    assert_eq!(history[1].total_points, 15);
}

#[tokio::test]
async fn test_league_is_decoded() {
    let root = spawn_upstream().await;
    let client = client(format!("{}/api", root), 5);

    let league = client.league(10).await.unwrap();

    assert_eq!(league.name, "Office League");
    assert_eq!(league.team_ids(), vec![1, 2]);
    assert_eq!(league.managers[1].player_name, "Ben");
    assert_eq!(league.managers[1].entry_name, "Ben City");
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let root = spawn_upstream().await;
    let client = client(format!("{}/api", root), 5);

    assert!(matches!(client.history(99).await, Err(FetchError::Status(404))));
    assert!(matches!(client.league(99).await, Err(FetchError::Status(404))));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let root = spawn_upstream().await;
    let client = client(format!("{}/broken", root), 5);

    assert!(matches!(client.history(1).await, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let root = spawn_upstream().await;
    let client = client(format!("{}/slow", root), 1);

    assert!(matches!(client.history(1).await, Err(FetchError::Timeout(_))));
}

#[tokio::test]
async fn test_unreachable_upstream_is_request_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(format!("http://{}", addr), 2);

    assert!(matches!(client.history(1).await, Err(FetchError::Request(_))));
}

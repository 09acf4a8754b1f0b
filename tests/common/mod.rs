//! Shared fixtures: a relay wired to a wiremock server standing in for both Spotify's accounts service and Web API.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use vibelist::{
    config::Config,
    server::{self, AppState},
};
use wiremock::MockServer;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:3001/callback";
pub const FRONTEND: &str = "http://localhost:3000";

pub fn config(mock: &MockServer) -> Config {
    config_with(mock, &[])
}

pub fn config_with(mock: &MockServer, overrides: &[(&str, &str)]) -> Config {
    let static_dir = format!("{}/public", env!("CARGO_MANIFEST_DIR"));
    let api_base_url = format!("{}/v1/", mock.uri());
    let accounts_base_url = format!("{}/", mock.uri());

    let mut vars: HashMap<String, String> = [
        ("SPOTIFY_CLIENT_ID", CLIENT_ID),
        ("SPOTIFY_CLIENT_SECRET", CLIENT_SECRET),
        ("SPOTIFY_REDIRECT_URI", REDIRECT_URI),
        ("FRONTEND_URI", FRONTEND),
        ("STATIC_DIR", static_dir.as_str()),
        ("SPOTIFY_API_BASE_URL", api_base_url.as_str()),
        ("SPOTIFY_ACCOUNTS_BASE_URL", accounts_base_url.as_str()),
        ("UPSTREAM_TIMEOUT_SECS", "2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub fn app(mock: &MockServer) -> Router {
    server::router(AppState::new(config(mock)).unwrap())
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    (status, headers, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn user_json(id: &str) -> Value {
    json!({
        "id": id,
        "display_name": "Test User",
        "email": "test@example.com",
        "country": "FI",
        "product": "premium",
        "external_urls": { "spotify": format!("https://open.spotify.com/user/{id}") },
        "images": []
    })
}

pub fn playlist_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Vibelist: happy beats Vibe",
        "description": "A happy beats mood playlist generated by Vibelist",
        "public": false,
        "uri": format!("spotify:playlist:{id}"),
        "snapshot_id": "snap0",
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{id}") },
        "images": []
    })
}

pub fn recommendations_json(uris: &[&str]) -> Value {
    let tracks: Vec<Value> = uris
        .iter()
        .enumerate()
        .map(|(i, uri)| {
            json!({
                "id": uri.rsplit(':').next(),
                "name": format!("Track {i}"),
                "uri": uri,
                "artists": [{ "id": "a1", "name": "Artist", "uri": "spotify:artist:a1" }],
                "album": { "id": "al1", "name": "Album", "images": [] },
                "duration_ms": 180000,
                "explicit": false,
                "preview_url": null,
                "external_urls": { "spotify": "https://open.spotify.com/track/x" }
            })
        })
        .collect();

    json!({ "tracks": tracks, "seeds": [] })
}

pub fn snapshot_json() -> Value {
    json!({ "snapshot_id": "snap1" })
}

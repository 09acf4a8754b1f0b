mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header as header_matcher, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use common::{app, get, playlist_json, post_json, recommendations_json, snapshot_json};

#[tokio::test]
async fn recommendations_forwards_seeds() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/recommendations"))
        .and(header_matcher("authorization", "Bearer user-token"))
        .and(query_param("limit", "10"))
        .and(query_param("seed_genres", "rock"))
        .and(query_param("seed_tracks", "t1,t2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(recommendations_json(&["spotify:track:t3", "spotify:track:t4"])),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let (status, _, body) = common::send(
        app(&mock),
        get("/recommendations?seed_genres=rock&seed_tracks=t1,t2&token=user-token"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["uri"], "spotify:track:t3");
    assert_eq!(body[1]["uri"], "spotify:track:t4");
}

#[tokio::test]
async fn recommendations_require_token_and_seed() {
    let mock = MockServer::start().await;

    let (status, _, body) = common::send(app(&mock), get("/recommendations?seed_genres=rock")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_token");

    let (status, _, body) = common::send(app(&mock), get("/recommendations?token=user-token")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_seed");

    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn recommendations_upstream_failure() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/recommendations"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "status": 404, "message": "Service not found" }
        })))
        .mount(&mock)
        .await;

    let (status, _, body) =
        common::send(app(&mock), get("/recommendations?seed_artists=a1&token=user-token")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Failed to fetch recommendations: Unhandled API error 404: Service not found"
    );
}

#[tokio::test]
async fn create_playlist_adds_tracks() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/users/u1/playlists"))
        .and(body_json(json!({ "name": "Road trip", "public": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(playlist_json("p1")))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/p1/tracks"))
        .and(body_json(json!({ "uris": ["spotify:track:a", "spotify:track:b"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(snapshot_json()))
        .expect(1)
        .mount(&mock)
        .await;

    let (status, _, body) = common::send(
        app(&mock),
        post_json(
            "/create-playlist",
            json!({
                "user_id": "u1",
                "playlist_name": "Road trip",
                "track_uris": ["spotify:track:a", "spotify:track:b"],
                "token": "user-token"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Playlist created successfully", "playlistId": "p1" })
    );
}

#[tokio::test]
async fn create_playlist_without_tracks_skips_add() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/users/u1/playlists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(playlist_json("p1")))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(snapshot_json()))
        .expect(0)
        .mount(&mock)
        .await;

    let (status, _, body) = common::send(
        app(&mock),
        post_json(
            "/create-playlist",
            json!({ "user_id": "u1", "playlist_name": "Empty", "token": "user-token" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playlistId"], "p1");
}

#[tokio::test]
async fn create_playlist_failure_envelope() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/users/u1/playlists"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "Invalid access token" }
        })))
        .mount(&mock)
        .await;

    let (status, _, body) = common::send(
        app(&mock),
        post_json(
            "/create-playlist",
            json!({ "user_id": "u1", "playlist_name": "x", "track_uris": [], "token": "bad" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "playlist_create_failed");
    assert_eq!(
        body["error"],
        "Failed to create playlist: The access token was rejected: Invalid access token"
    );
}

#[tokio::test]
async fn discard_playlist_unfollows() {
    let mock = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/playlists/p1/followers"))
        .and(header_matcher("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock)
        .await;

    let (status, _, body) = common::send(
        app(&mock),
        post_json("/discard-playlist", json!({ "playlistId": "p1", "token": "user-token" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn discard_playlist_requires_id() {
    let mock = MockServer::start().await;

    let (status, _, body) = common::send(
        app(&mock),
        post_json("/discard-playlist", json!({ "token": "user-token" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() {
    let mock = MockServer::start().await;

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/generate-playlist")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = common::send(app(&mock), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn cors_rejects_other_origins() {
    let mock = MockServer::start().await;

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/generate-playlist")
        .header(header::ORIGIN, "http://evil.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = common::send(app(&mock), req).await;

    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn landing_page_is_html() {
    let mock = MockServer::start().await;

    let (status, headers, body) = common::send(app(&mock), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(body.as_str().unwrap().contains("/login"));
}

#[tokio::test]
async fn unmatched_paths_are_served_from_static_dir() {
    let mock = MockServer::start().await;

    let (status, _, body) = common::send(app(&mock), get("/robots.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("User-agent"));

    let (status, _, _) = common::send(app(&mock), get("/does-not-exist.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

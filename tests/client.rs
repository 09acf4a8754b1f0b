mod common;

use std::time::Duration;

use serde_json::json;
use vibelist::{
    client::{SpotifyClient, SpotifyClientBuilder},
    model::track::RecommendationsRequest,
    prelude::*,
    Error,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client(mock: &MockServer) -> SpotifyClient {
    SpotifyClientBuilder::new(common::CLIENT_ID, common::CLIENT_SECRET)
        .api_base_url(format!("{}/v1/", mock.uri()))
        .accounts_base_url(format!("{}/", mock.uri()))
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

#[tokio::test]
async fn long_item_lists_are_added_in_chunks() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::snapshot_json()))
        .expect(3)
        .mount(&mock)
        .await;

    let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:{i}")).collect();
    let snapshot = client(&mock)
        .user_client("user-token")
        .add_items_to_playlist("p1", &uris)
        .await
        .unwrap();

    assert_eq!(snapshot.unwrap().snapshot_id, "snap1");

    let requests = mock.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body["uris"].as_array().unwrap().len()
        })
        .collect();

    assert_eq!(sizes, vec![100, 100, 50]);
}

#[tokio::test]
async fn expired_token_is_recognised() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&mock)
        .await;

    let err = client(&mock)
        .user_client("stale")
        .current_user_profile()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AccessTokenExpired));
    assert!(err.is_authentication_failure());
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/recommendations"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "12"))
        .expect(1)
        .mount(&mock)
        .await;

    let err = client(&mock)
        .user_client("user-token")
        .recommendations(&RecommendationsRequest::new().seed_genre("pop"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimit(12)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::user_json("u1"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock)
        .await;

    let err = client(&mock)
        .user_client("user-token")
        .current_user_profile()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout));
}

#[tokio::test]
async fn invalid_client_is_reported_by_token_exchange() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client secret"
        })))
        .mount(&mock)
        .await;

    let err = client(&mock)
        .authorization_code_client(common::REDIRECT_URI)
        .build()
        .finalize("code")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidClient));
}

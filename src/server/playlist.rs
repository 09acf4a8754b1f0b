//! The JSON endpoints. Every one of them needs the user's access token, which is taken from the request body or query
//! or, failing that, from an `Authorization: Bearer` header. The token is forwarded to Spotify as is.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap},
    Json,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{error::ApiError, AppState};
use crate::{
    client::{AccessTokenUserClient, ScopedClient, UnscopedClient},
    generator,
    model::{
        playlist::NewPlaylist,
        track::{RecommendationsRequest, Track},
    },
};

/// Number of tracks returned by `GET /recommendations`.
const RECOMMENDATIONS_ENDPOINT_LIMIT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct GeneratePlaylistRequest {
    pub vibe: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlaylistResponse {
    pub success: bool,
    pub playlist_url: String,
    pub tracks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsParams {
    pub seed_tracks: Option<String>,
    pub seed_artists: Option<String>,
    pub seed_genres: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaylistRequest {
    pub user_id: Option<String>,
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub track_uris: Vec<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistResponse {
    pub message: &'static str,
    pub playlist_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardPlaylistRequest {
    pub playlist_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// POST /generate-playlist
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GeneratePlaylistRequest>, JsonRejection>,
) -> Result<Json<GeneratePlaylistResponse>, ApiError> {
    let Json(request) = payload?;

    let client = user_client(&state, request.token, &headers)?;
    let vibe = non_blank(request.vibe).ok_or(ApiError::MissingVibe)?;

    let generated = generator::generate_playlist(&client, &state.config.playlist, &vibe).await?;

    Ok(Json(GeneratePlaylistResponse {
        success: true,
        playlist_url: generated.playlist_url,
        tracks: generated.tracks,
    }))
}

/// GET /recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<RecommendationsParams>, QueryRejection>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let Query(params) = params?;

    let client = user_client(&state, params.token, &headers)?;
    let request = RecommendationsRequest {
        limit: Some(RECOMMENDATIONS_ENDPOINT_LIMIT),
        seed_genres: split_seeds(params.seed_genres),
        seed_artists: split_seeds(params.seed_artists),
        seed_tracks: split_seeds(params.seed_tracks),
        target_valence: None,
    };

    if !request.has_seed() {
        return Err(ApiError::MissingSeed);
    }

    let recommendations = client
        .recommendations(&request)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to fetch recommendations",
            code: "recommendations_failed",
            source,
        })?;

    Ok(Json(recommendations.tracks))
}

/// POST /create-playlist
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<Json<CreatePlaylistResponse>, ApiError> {
    let Json(request) = payload?;

    let client = user_client(&state, request.token, &headers)?;
    let user_id = non_blank(request.user_id).ok_or_else(|| ApiError::InvalidRequest(String::from("Missing user_id")))?;
    let name = non_blank(request.playlist_name)
        .ok_or_else(|| ApiError::InvalidRequest(String::from("Missing playlist_name")))?;

    let playlist = client
        .create_playlist(&user_id, &NewPlaylist::private(&name))
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to create playlist",
            code: "playlist_create_failed",
            source,
        })?;

    client
        .add_items_to_playlist(&playlist.id, &request.track_uris)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to create playlist",
            code: "tracks_add_failed",
            source,
        })?;

    info!(
        "Created playlist {} with {} tracks",
        playlist.id,
        request.track_uris.len()
    );

    Ok(Json(CreatePlaylistResponse {
        message: "Playlist created successfully",
        playlist_id: playlist.id,
    }))
}

/// POST /discard-playlist
pub async fn discard(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DiscardPlaylistRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;

    let client = user_client(&state, request.token, &headers)?;
    let playlist_id =
        non_blank(request.playlist_id).ok_or_else(|| ApiError::InvalidRequest(String::from("Missing playlistId")))?;

    generator::discard_playlist(&client, &playlist_id)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to discard playlist",
            code: "playlist_discard_failed",
            source,
        })?;

    Ok(Json(SuccessResponse { success: true }))
}

fn user_client(state: &AppState, token: Option<String>, headers: &HeaderMap) -> Result<AccessTokenUserClient, ApiError> {
    let token = resolve_token(token, headers).ok_or(ApiError::MissingToken)?;
    debug!("Using access token from request");

    Ok(state.spotify.user_client(token))
}

/// The access token from the request itself, or from a bearer `Authorization` header if the request has none.
fn resolve_token(token: Option<String>, headers: &HeaderMap) -> Option<String> {
    non_blank(token).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn split_seeds(seeds: Option<String>) -> Vec<String> {
    seeds
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|seed| !seed.is_empty())
        .map(str::to_owned)
        .collect()
}

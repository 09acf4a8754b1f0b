//! The playlist generation pipeline.
//!
//! Generating a playlist for a vibe takes four dependent calls to Spotify, run strictly one after the other:
//!
//! 1. [resolve the user](PipelineStep::ResolveIdentity) the access token belongs to,
//! 2. [create a private playlist](PipelineStep::CreatePlaylist) named after the vibe for them,
//! 3. [fetch recommended tracks](PipelineStep::FetchRecommendations) with a target valence chosen by the
//!    [mood table](crate::mood::MoodTable),
//! 4. [add the tracks](PipelineStep::PopulatePlaylist) to the playlist.
//!
//! The first failing step stops the pipeline and is named in the returned [PipelineError]. Nothing is rolled back: a
//! playlist created before a later step fails stays on the user's account. Removing it is a separate, explicit
//! operation, [discard_playlist].

use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    client::{ScopedClient, UnscopedClient},
    error::{Error, Result},
    model::{
        playlist::{NewPlaylist, Playlist},
        track::RecommendationsRequest,
    },
    mood::MoodTable,
};

/// How generated playlists are named and which recommendations are asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSettings {
    /// Prefixes every generated playlist's name and appears in its description.
    pub name_prefix: String,
    /// The single genre used to seed recommendations.
    pub seed_genre: String,
    pub recommendation_limit: u32,
    pub mood: MoodTable,
}

/// One of the pipeline's four steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ResolveIdentity,
    CreatePlaylist,
    FetchRecommendations,
    PopulatePlaylist,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to {step}: {source}")]
    Step {
        step: PipelineStep,
        #[source]
        source: Error,
    },
    #[error("No tracks found for this vibe")]
    NoTracksFound,
}

/// A successfully generated and populated playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlaylist {
    pub playlist_id: String,
    pub playlist_url: String,
    /// The track URIs added to the playlist, in the order they were added.
    pub tracks: Vec<String>,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            name_prefix: String::from("Vibelist"),
            seed_genre: String::from("pop"),
            recommendation_limit: 20,
            mood: MoodTable::default(),
        }
    }
}

impl PlaylistSettings {
    /// The name of the playlist generated for a vibe, such as `Vibelist: happy beats Vibe`.
    pub fn playlist_name(&self, vibe: &str) -> String {
        format!("{}: {vibe} Vibe", self.name_prefix)
    }

    pub fn playlist_description(&self, vibe: &str) -> String {
        format!("A {vibe} mood playlist generated by {}", self.name_prefix)
    }

    /// The recommendations request for a vibe: the configured limit and genre seed, and the vibe's target valence.
    pub fn recommendations_request(&self, vibe: &str) -> RecommendationsRequest {
        RecommendationsRequest::new()
            .limit(self.recommendation_limit)
            .seed_genre(self.seed_genre.as_str())
            .target_valence(self.mood.target_valence(vibe))
    }
}

impl PipelineStep {
    /// Stable machine-readable code for a failure in this step.
    pub fn code(self) -> &'static str {
        match self {
            PipelineStep::ResolveIdentity => "identity_failed",
            PipelineStep::CreatePlaylist => "playlist_create_failed",
            PipelineStep::FetchRecommendations => "recommendations_failed",
            PipelineStep::PopulatePlaylist => "tracks_add_failed",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStep::ResolveIdentity => "resolve the current user",
            PipelineStep::CreatePlaylist => "create the playlist",
            PipelineStep::FetchRecommendations => "fetch recommendations",
            PipelineStep::PopulatePlaylist => "add tracks to the playlist",
        })
    }
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Step { step, .. } => step.code(),
            PipelineError::NoTracksFound => "no_tracks_found",
        }
    }

    /// The step that failed. `None` for [NoTracksFound](PipelineError::NoTracksFound), which isn't an upstream
    /// failure.
    pub fn step(&self) -> Option<PipelineStep> {
        match self {
            PipelineError::Step { step, .. } => Some(*step),
            PipelineError::NoTracksFound => None,
        }
    }

    /// The Spotify error that stopped the pipeline, if any.
    pub fn upstream(&self) -> Option<&Error> {
        match self {
            PipelineError::Step { source, .. } => Some(source),
            PipelineError::NoTracksFound => None,
        }
    }
}

trait InStep<T> {
    fn in_step(self, step: PipelineStep) -> std::result::Result<T, PipelineError>;
}

impl<T> InStep<T> for Result<T> {
    fn in_step(self, step: PipelineStep) -> std::result::Result<T, PipelineError> {
        self.map_err(|source| PipelineError::Step { step, source })
    }
}

/// Runs the whole pipeline for a vibe with the given user client.
///
/// Makes at most four kinds of requests and never retries. Calling this twice with the same vibe creates two
/// playlists.
pub async fn generate_playlist<C>(
    client: &C,
    settings: &PlaylistSettings,
    vibe: &str,
) -> std::result::Result<GeneratedPlaylist, PipelineError>
where
    C: ScopedClient + UnscopedClient,
{
    let user_id = resolve_identity(client).await?;
    let playlist = create_playlist(client, settings, &user_id, vibe).await?;

    let tracks = match fetch_recommendations(client, settings, vibe).await {
        Ok(tracks) => tracks,
        Err(err) => return Err(orphaned(&playlist, err)),
    };

    if let Err(err) = populate_playlist(client, &playlist, &tracks).await {
        return Err(orphaned(&playlist, err));
    }

    info!(
        "Generated playlist {} with {} tracks for vibe {vibe:?}",
        playlist.id,
        tracks.len()
    );

    Ok(GeneratedPlaylist {
        playlist_url: playlist.web_url(),
        playlist_id: playlist.id,
        tracks,
    })
}

/// Removes a playlist from the current user's library, which is how Spotify deletes a playlist the user owns. Meant
/// for playlists left behind by a failed [generate_playlist].
pub async fn discard_playlist<C>(client: &C, playlist_id: &str) -> Result<()>
where
    C: ScopedClient,
{
    info!("Discarding playlist {playlist_id}");
    client.unfollow_playlist(playlist_id).await
}

async fn resolve_identity<C>(client: &C) -> std::result::Result<String, PipelineError>
where
    C: ScopedClient,
{
    let user = client
        .current_user_profile()
        .await
        .in_step(PipelineStep::ResolveIdentity)?;

    debug!("Generating playlist for user {} ({})", user.id, user.name());
    Ok(user.id)
}

async fn create_playlist<C>(
    client: &C,
    settings: &PlaylistSettings,
    user_id: &str,
    vibe: &str,
) -> std::result::Result<Playlist, PipelineError>
where
    C: ScopedClient,
{
    let name = settings.playlist_name(vibe);
    let description = settings.playlist_description(vibe);

    client
        .create_playlist(user_id, &NewPlaylist::private(&name).description(&description))
        .await
        .in_step(PipelineStep::CreatePlaylist)
}

async fn fetch_recommendations<C>(
    client: &C,
    settings: &PlaylistSettings,
    vibe: &str,
) -> std::result::Result<Vec<String>, PipelineError>
where
    C: UnscopedClient,
{
    let request = settings.recommendations_request(vibe);
    debug!("Requesting recommendations for vibe {vibe:?}: {request:?}");

    let recommendations = client
        .recommendations(&request)
        .await
        .in_step(PipelineStep::FetchRecommendations)?;

    Ok(recommendations.track_uris())
}

async fn populate_playlist<C>(
    client: &C,
    playlist: &Playlist,
    tracks: &[String],
) -> std::result::Result<(), PipelineError>
where
    C: ScopedClient,
{
    if tracks.is_empty() {
        return Err(PipelineError::NoTracksFound);
    }

    client
        .add_items_to_playlist(&playlist.id, tracks)
        .await
        .in_step(PipelineStep::PopulatePlaylist)?;

    Ok(())
}

fn orphaned(playlist: &Playlist, err: PipelineError) -> PipelineError {
    warn!(
        "Playlist {} was created but generation failed afterwards; it is left on the user's account: {err}",
        playlist.id
    );

    err
}

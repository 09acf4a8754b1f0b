//! Tracks and recommendations.

use serde::{Deserialize, Serialize};

use super::{ExternalUrls, Image};

/// Maximum number of tracks the recommendations endpoint returns in one response.
pub const MAX_RECOMMENDATION_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialArtist {
    pub id: Option<String>,
    pub name: String,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAlbum {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A track as it appears in a recommendations response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<PartialArtist>,
    pub album: Option<PartialAlbum>,
    pub duration_ms: Option<u32>,
    #[serde(default)]
    pub explicit: bool,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Response from the recommendations endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub seeds: Vec<RecommendationSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSeed {
    pub id: String,
    #[serde(rename = "type")]
    pub seed_type: String,
    pub initial_pool_size: Option<u32>,
    pub after_filtering_size: Option<u32>,
}

/// Parameters of a recommendations request. At least one seed should be given for Spotify to accept the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationsRequest {
    pub limit: Option<u32>,
    pub seed_genres: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub target_valence: Option<f32>,
}

impl Recommendations {
    /// The URIs of the recommended tracks, in the order Spotify returned them.
    pub fn track_uris(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.uri.clone()).collect()
    }
}

impl RecommendationsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(self, limit: u32) -> Self {
        Self {
            limit: Some(limit.clamp(1, MAX_RECOMMENDATION_LIMIT)),
            ..self
        }
    }

    pub fn seed_genre<S>(mut self, genre: S) -> Self
    where
        S: Into<String>,
    {
        self.seed_genres.push(genre.into());
        self
    }

    pub fn target_valence(self, target_valence: f32) -> Self {
        Self {
            target_valence: Some(target_valence),
            ..self
        }
    }

    pub fn has_seed(&self) -> bool {
        !(self.seed_genres.is_empty() && self.seed_artists.is_empty() && self.seed_tracks.is_empty())
    }

    /// The request's query parameters. Empty seed lists are left out.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        for (key, seeds) in [
            ("seed_genres", &self.seed_genres),
            ("seed_artists", &self.seed_artists),
            ("seed_tracks", &self.seed_tracks),
        ] {
            if !seeds.is_empty() {
                pairs.push((key, seeds.join(",")));
            }
        }

        if let Some(target_valence) = self.target_valence {
            pairs.push(("target_valence", target_valence.to_string()));
        }

        pairs
    }
}

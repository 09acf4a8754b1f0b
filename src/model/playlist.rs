//! Playlists and the request bodies used to create and fill them.

use serde::{Deserialize, Serialize};

use super::{ExternalUrls, Image};

const PLAYLIST_WEB_URL_BASE: &str = "https://open.spotify.com/playlist/";

/// A playlist as returned when creating one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub uri: Option<String>,
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Body of a create playlist request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPlaylist<'a> {
    pub name: &'a str,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddItemsBody<'a> {
    pub uris: &'a [String],
}

/// Response to modifying a playlist's items. The snapshot ID identifies the playlist's version after the change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotId {
    pub snapshot_id: String,
}

impl Playlist {
    /// The playlist's link in the Spotify web player. Built from the playlist ID if Spotify didn't return one.
    pub fn web_url(&self) -> String {
        self.external_urls
            .spotify
            .clone()
            .unwrap_or_else(|| format!("{PLAYLIST_WEB_URL_BASE}{}", self.id))
    }
}

impl<'a> NewPlaylist<'a> {
    /// A private playlist with the given name and no description.
    pub fn private(name: &'a str) -> Self {
        Self {
            name,
            public: false,
            description: None,
        }
    }

    pub fn description(self, description: &'a str) -> Self {
        Self {
            description: Some(description),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_url_prefers_external_url() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Vibelist: chill Vibe",
            "external_urls": { "spotify": "https://open.spotify.com/playlist/p1?si=abc" }
        }))
        .unwrap();

        assert_eq!(playlist.web_url(), "https://open.spotify.com/playlist/p1?si=abc");
    }

    #[test]
    fn web_url_falls_back_to_id() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({ "id": "p2", "name": "x" })).unwrap();
        assert_eq!(playlist.web_url(), "https://open.spotify.com/playlist/p2");
    }

    #[test]
    fn new_private_playlist_body() {
        let body = serde_json::to_value(NewPlaylist::private("Vibelist: calm Vibe").description("calm")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "name": "Vibelist: calm Vibe", "public": false, "description": "calm" })
        );
    }
}

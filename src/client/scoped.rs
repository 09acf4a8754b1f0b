use log::{debug, trace};
use reqwest::Method;

use super::{
    private, API_CURRENT_USER_PATH, API_PLAYLISTS_PATH, API_PLAYLIST_FOLLOWERS_PATH, API_PLAYLIST_TRACKS_PATH,
    API_USERS_PATH, PLAYLIST_ITEMS_CHUNK_SIZE,
};
use crate::{
    error::Result,
    model::{
        playlist::{AddItemsBody, NewPlaylist, Playlist, SnapshotId},
        user::CurrentUser,
    },
};

/// All scoped Spotify endpoints the relay uses. The functions in this trait require user authentication, since they're
/// specific to a certain user. [AuthorizationCodeUserClient](crate::client::AuthorizationCodeUserClient) and
/// [AccessTokenUserClient](crate::client::AccessTokenUserClient) implement this trait.
#[async_trait::async_trait]
pub trait ScopedClient: private::BuildHttpRequest + Sync {
    /// Get detailed profile information about the current user.
    ///
    /// Required scopes: [UserReadPrivate](crate::scope::Scope::UserReadPrivate) for the country and product fields and
    /// [UserReadEmail](crate::scope::Scope::UserReadEmail) for the email field. Without them the request still succeeds.
    async fn current_user_profile(&self) -> Result<CurrentUser> {
        let user: CurrentUser = self
            .send_http_request(Method::GET, self.api_url(&[API_CURRENT_USER_PATH]))
            .send_json()
            .await?;

        trace!("Current user profile: {:?}", user);
        Ok(user)
    }

    /// Create a playlist for a Spotify user. The playlist will be empty until you add tracks.
    ///
    /// Required scope: [PlaylistModifyPublic](crate::scope::Scope::PlaylistModifyPublic) for a public playlist,
    /// [PlaylistModifyPrivate](crate::scope::Scope::PlaylistModifyPrivate) for a private one.
    async fn create_playlist(&self, user_id: &str, playlist: &NewPlaylist<'_>) -> Result<Playlist> {
        let created: Playlist = self
            .send_http_request(
                Method::POST,
                self.api_url(&[API_USERS_PATH, user_id, API_PLAYLISTS_PATH]),
            )
            .body(playlist)
            .send_json()
            .await?;

        debug!("Created playlist {} for user {user_id}", created.id);
        Ok(created)
    }

    /// Add items to a playlist, in the given order, after the playlist's existing items.
    ///
    /// Spotify accepts at most 100 items per request, so longer lists are sent in consecutive chunks. Returns the
    /// snapshot ID of the last change, or `None` if `uris` is empty, in which case no request is made.
    ///
    /// Required scope: [PlaylistModifyPublic](crate::scope::Scope::PlaylistModifyPublic) or
    /// [PlaylistModifyPrivate](crate::scope::Scope::PlaylistModifyPrivate), depending on the playlist.
    async fn add_items_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<Option<SnapshotId>> {
        let mut snapshot = None;

        for chunk in uris.chunks(PLAYLIST_ITEMS_CHUNK_SIZE) {
            let response: SnapshotId = self
                .send_http_request(
                    Method::POST,
                    self.api_url(&[API_PLAYLISTS_PATH, playlist_id, API_PLAYLIST_TRACKS_PATH]),
                )
                .body(AddItemsBody { uris: chunk })
                .send_json()
                .await?;

            debug!(
                "Added {} items to playlist {playlist_id}, snapshot {}",
                chunk.len(),
                response.snapshot_id
            );

            snapshot = Some(response);
        }

        Ok(snapshot)
    }

    /// Remove the current user as a follower of a playlist. For a playlist the user owns, this is how Spotify deletes
    /// it.
    async fn unfollow_playlist(&self, playlist_id: &str) -> Result<()> {
        self.send_http_request(
            Method::DELETE,
            self.api_url(&[API_PLAYLISTS_PATH, playlist_id, API_PLAYLIST_FOLLOWERS_PATH]),
        )
        .send_async()
        .await?;

        debug!("Unfollowed playlist {playlist_id}");
        Ok(())
    }
}

//! OAuth authorization scopes.
//!
//! [Spotify documentation on scopes.](https://developer.spotify.com/documentation/web-api/concepts/scopes)

use std::fmt::Display;

/// The scopes the relay asks the user to grant when logging in: enough to read their profile and to create and modify
/// their playlists.
pub const LOGIN_SCOPES: [Scope; 4] = [
    Scope::UserReadPrivate,
    Scope::UserReadEmail,
    Scope::PlaylistModifyPublic,
    Scope::PlaylistModifyPrivate,
];

pub trait ToScopesString {
    fn to_scopes_string(self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    UserReadPrivate,
    UserReadEmail,
    UserTopRead,
    PlaylistReadPrivate,
    PlaylistReadCollaborative,
    PlaylistModifyPublic,
    PlaylistModifyPrivate,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::UserReadPrivate => "user-read-private",
            Scope::UserReadEmail => "user-read-email",
            Scope::UserTopRead => "user-top-read",
            Scope::PlaylistReadPrivate => "playlist-read-private",
            Scope::PlaylistReadCollaborative => "playlist-read-collaborative",
            Scope::PlaylistModifyPublic => "playlist-modify-public",
            Scope::PlaylistModifyPrivate => "playlist-modify-private",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<I> ToScopesString for I
where
    I: IntoIterator<Item = Scope>,
{
    fn to_scopes_string(self) -> String {
        self.into_iter().map(Scope::as_str).collect::<Vec<_>>().join(" ")
    }
}

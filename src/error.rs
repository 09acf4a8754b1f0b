use thiserror::Error;

use crate::model::error::AuthenticationErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may occur while talking to Spotify's accounts service or Web API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("The authorization code is invalid or has already been used")]
    InvalidAuthorizationCode,
    #[error("The application's client ID or client secret is invalid")]
    InvalidClient,
    #[error("Unhandled authentication error: {0:?}: {1}")]
    UnhandledAuthenticationError(AuthenticationErrorKind, String),

    #[error("The access token expired")]
    AccessTokenExpired,
    #[error("The required scope for the endpoint hasn't been granted by the user")]
    MissingScope,
    #[error("The access token was rejected: {0}")]
    Unauthorized(String),
    #[error("The endpoint is forbidden: {0}")]
    Forbidden(String),

    #[error("Request rate limit hit; retry after {0} seconds")]
    RateLimit(u64),
    #[error(
        "Missing or invalid Retry-After header in 429 rate-limit response. This is likely an issue on Spotify's side"
    )]
    InvalidRateLimitResponse,

    #[error("Unhandled API error {0}: {1}")]
    UnhandledSpotifyError(u16, String),

    #[error("The request to Spotify timed out")]
    Timeout,
    #[error("Invalid base URL {0}: it cannot have path segments appended to it")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    HttpError(#[from] reqwest::Error),
}

impl Error {
    /// Whether the error means the user's access token is unusable, as opposed to the request itself failing.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Error::AccessTokenExpired | Error::Unauthorized(_))
    }
}

/// Maps a transport-level reqwest error into an [Error], separating timeouts from other failures.
pub(crate) fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::HttpError(err)
    }
}

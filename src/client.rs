//! Clients for Spotify's accounts service and Web API.
//!
//! [SpotifyClient] holds the application's credentials and is built once at startup. From it you get per-user
//! clients:
//!
//! - an [AuthorizationCodeUserClient] by running the authorization code flow through
//!   [`authorization_code_client`](SpotifyClient::authorization_code_client), or
//! - an [AccessTokenUserClient] for a bearer token the caller already has, through
//!   [`user_client`](SpotifyClient::user_client).
//!
//! Both user clients implement the [ScopedClient] and [UnscopedClient] endpoint traits.

pub(crate) mod access_token;
pub(crate) mod authorization_code;
pub(crate) mod private;
pub(crate) mod scoped;
pub(crate) mod unscoped;

pub use self::{
    access_token::AccessTokenUserClient,
    authorization_code::{
        AuthorizationCodeUserClient, AuthorizationCodeUserClientBuilder, IncompleteAuthorizationCodeUserClient,
    },
    scoped::ScopedClient,
    unscoped::UnscopedClient,
};

use std::{fmt, sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine};
use const_format::concatcp;
use log::{debug, error};
use reqwest::{Client as AsyncClient, StatusCode, Url};

use crate::{
    error::{map_transport_error, Error, Result},
    model::error::{extract_error_message, AuthenticationErrorResponse},
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1/";
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com/";

const USER_AGENT: &str = concatcp!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// accounts endpoints, relative to the accounts base URL
const ACCOUNTS_AUTHORIZE_PATH: &[&str] = &["authorize"];
const ACCOUNTS_API_TOKEN_PATH: &[&str] = &["api", "token"];

// web API endpoints, relative to the API base URL
const API_CURRENT_USER_PATH: &str = "me";
const API_USERS_PATH: &str = "users";
const API_PLAYLISTS_PATH: &str = "playlists";
const API_PLAYLIST_TRACKS_PATH: &str = "tracks";
const API_PLAYLIST_FOLLOWERS_PATH: &str = "followers";
const API_RECOMMENDATIONS_PATH: &str = "recommendations";

/// Maximum number of items Spotify accepts in one add items to playlist request.
const PLAYLIST_ITEMS_CHUNK_SIZE: usize = 100;

/// The application-level Spotify client. Holds the client ID and secret and a shared HTTP connection pool.
///
/// This client uses `Arc` internally, so cloning it is cheap and you do not need to wrap it in an `Arc` in order to
/// share it between requests.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    inner: Arc<SpotifyClientRef>,
    http_client: AsyncClient,
}

struct SpotifyClientRef {
    client_id: String,
    client_secret: String,
    api_base_url: Url,
    accounts_base_url: Url,
}

/// Builder for [SpotifyClient].
#[derive(Debug, Clone)]
pub struct SpotifyClientBuilder {
    client_id: String,
    client_secret: String,
    api_base_url: String,
    accounts_base_url: String,
    timeout: Duration,
}

impl SpotifyClient {
    /// Begin building an [AuthorizationCodeUserClient]. The redirect URI must match one of the redirect URIs
    /// registered for the Spotify application.
    pub fn authorization_code_client<S>(&self, redirect_uri: S) -> AuthorizationCodeUserClientBuilder
    where
        S: Into<String>,
    {
        AuthorizationCodeUserClientBuilder::new(redirect_uri.into(), Arc::clone(&self.inner), self.http_client.clone())
    }

    /// Returns a client that authenticates every request with the given user access token. The token is used as is;
    /// it is not validated or refreshed.
    pub fn user_client<S>(&self, access_token: S) -> AccessTokenUserClient
    where
        S: Into<String>,
    {
        AccessTokenUserClient::new(
            access_token.into(),
            self.inner.api_base_url.clone(),
            self.http_client.clone(),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }
}

impl fmt::Debug for SpotifyClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClientRef")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("accounts_base_url", &self.accounts_base_url.as_str())
            .finish()
    }
}

impl SpotifyClientBuilder {
    pub fn new<I, S>(client_id: I, client_secret: S) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the Web API base URL. Defaults to [DEFAULT_API_BASE_URL].
    pub fn api_base_url<S>(self, api_base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            api_base_url: api_base_url.into(),
            ..self
        }
    }

    /// Override the accounts service base URL. Defaults to [DEFAULT_ACCOUNTS_BASE_URL].
    pub fn accounts_base_url<S>(self, accounts_base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            accounts_base_url: accounts_base_url.into(),
            ..self
        }
    }

    /// Total time allowed for any single request to Spotify, from connecting until the response body has been read.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn build(self) -> Result<SpotifyClient> {
        let api_base_url = parse_base_url(&self.api_base_url)?;
        let accounts_base_url = parse_base_url(&self.accounts_base_url)?;

        debug!(
            "Building Spotify client with API base {api_base_url}, accounts base {accounts_base_url} and timeout {:?}",
            self.timeout
        );

        let http_client = AsyncClient::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        Ok(SpotifyClient {
            inner: Arc::new(SpotifyClientRef {
                client_id: self.client_id,
                client_secret: self.client_secret,
                api_base_url,
                accounts_base_url,
            }),
            http_client,
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    match Url::parse(base_url) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url),
        _ => Err(Error::InvalidBaseUrl(base_url.to_owned())),
    }
}

/// Appends path segments to a base URL. Each segment is percent-encoded, so IDs cannot escape their segment.
pub(crate) fn build_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();

    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    url
}

fn build_authorization_header(client_id: &str, client_secret: &str) -> String {
    let auth = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(auth))
}

/// Takes a response for an authentication request and if it isn't successful, turns its body into an error. A 400
/// response is parsed as an authentication error. On success returns the given response without modifying it.
async fn extract_authentication_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_err(map_transport_error)?;
    error!("Got {status} response to token request: {body}");

    if status == StatusCode::BAD_REQUEST {
        if let Ok(error_response) = serde_json::from_str::<AuthenticationErrorResponse>(&body) {
            return Err(error_response.into_error());
        }
    }

    Err(Error::UnhandledSpotifyError(
        status.as_u16(),
        extract_error_message(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_owned()),
    ))
}

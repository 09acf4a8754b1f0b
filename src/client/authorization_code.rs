//! Contains the [AuthorizationCodeUserClient] and its builder structs. The client implements the authorization code
//! flow.
//!
//! [Spotify documentation on the authorization code flow.](https://developer.spotify.com/documentation/web-api/tutorials/code-flow)
//!
//! # Usage
//!
//! ```no_run
//! # use vibelist::client::SpotifyClientBuilder;
//! # use vibelist::scope::LOGIN_SCOPES;
//! # async fn foo() {
//! let spotify_client = SpotifyClientBuilder::new("application client ID", "application client secret")
//!     .build()
//!     .expect("failed to build Spotify client");
//!
//! let incomplete_auth_code_client = spotify_client
//!     // the callback URL here should match one of the callback URLs
//!     // specified in your Spotify application
//!     .authorization_code_client("http://localhost:3001/callback")
//!     .scopes(LOGIN_SCOPES)
//!     .build();
//!
//! // the user should now be directed to this URL in some manner
//! let authorize_url = incomplete_auth_code_client.get_authorize_url();
//!
//! // when the user accepts, they are redirected to the callback URL with an
//! // authorization code (`code`) in the query parameters
//! # let code = "";
//! let user_client = incomplete_auth_code_client
//!     .finalize(code)
//!     .await
//!     .expect("failed to finalize authorization code flow client");
//!
//! println!("access token: {}", user_client.access_token());
//! # }
//! ```

use std::sync::Arc;

use log::debug;
use reqwest::{header, Client as AsyncClient, Method, Url};
use serde::Deserialize;

use super::{private, SpotifyClientRef, ACCOUNTS_API_TOKEN_PATH, ACCOUNTS_AUTHORIZE_PATH};
use crate::{
    error::{map_transport_error, Result},
    scope::ToScopesString,
};

/// A client that has completed the authorization code flow and holds the user's access and refresh tokens.
///
/// Implements all the [scoped](crate::client::ScopedClient) and [unscoped endpoints](crate::client::UnscopedClient).
/// The tokens are not refreshed automatically.
#[derive(Clone)]
pub struct AuthorizationCodeUserClient {
    inner: Arc<AuthorizationCodeUserClientRef>,
    api_base_url: Url,
    http_client: AsyncClient,
}

struct AuthorizationCodeUserClientRef {
    access_token: String,
    refresh_token: String,
    expires_in: u32,
}

/// An incomplete authorization code user client.
///
/// The client has been configured, and it has to be [finalized](IncompleteAuthorizationCodeUserClient::finalize) by
/// directing the user to the [authorize URL](IncompleteAuthorizationCodeUserClient::get_authorize_url) and retrieving
/// an authorization code from the redirect callback URL.
#[derive(Debug)]
pub struct IncompleteAuthorizationCodeUserClient {
    spotify_client: Arc<SpotifyClientRef>,
    redirect_uri: String,
    scopes: Option<String>,
    show_dialog: bool,

    http_client: AsyncClient,
}

/// Builder for [AuthorizationCodeUserClient].
#[derive(Debug)]
pub struct AuthorizationCodeUserClientBuilder {
    spotify_client: Arc<SpotifyClientRef>,
    redirect_uri: String,
    scopes: Option<String>,
    show_dialog: bool,

    http_client: AsyncClient,
}

#[derive(Debug, Deserialize)]
struct AuthorizeUserTokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u32,

    // these fields are in the response but the relay doesn't need them. keep them here for logging purposes
    scope: Option<String>,
    token_type: String,
}

impl AuthorizationCodeUserClient {
    pub fn access_token(&self) -> &str {
        &self.inner.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.inner.refresh_token
    }

    /// Seconds until the access token expires, counted from when it was issued.
    pub fn expires_in(&self) -> u32 {
        self.inner.expires_in
    }
}

impl std::fmt::Debug for AuthorizationCodeUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCodeUserClient")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.inner.expires_in)
            .finish()
    }
}

impl IncompleteAuthorizationCodeUserClient {
    /// Returns an authorization URL the user should be directed to in some manner.
    ///
    /// Once the user approves the application, they are redirected back to the application's callback URL. The URL
    /// query in the callback will contain a `code` parameter, which should be passed to the
    /// [`finalize`-function](IncompleteAuthorizationCodeUserClient::finalize) in order to complete the client and get
    /// an [AuthorizationCodeUserClient].
    pub fn get_authorize_url(&self) -> String {
        let mut authorize_url = super::build_url(&self.spotify_client.accounts_base_url, ACCOUNTS_AUTHORIZE_PATH);

        {
            let mut query = authorize_url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.spotify_client.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("show_dialog", if self.show_dialog { "true" } else { "false" });

            if let Some(scopes) = &self.scopes {
                query.append_pair("scope", scopes);
            }
        }

        authorize_url.into()
    }

    fn build_authorization_code_token_request_form<'a>(&'a self, code: &'a str) -> [(&'a str, &'a str); 3] {
        [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]
    }

    /// Finalize this client with the code from the callback URL query the user was redirected to after they approved
    /// the application and return an usable [AuthorizationCodeUserClient].
    ///
    /// This function makes exactly one request to the accounts service, authenticated with the application's client ID
    /// and secret, that exchanges the code for an access and a refresh token.
    pub async fn finalize(self, code: &str) -> Result<AuthorizationCodeUserClient> {
        debug!("Requesting access and refresh tokens for authorization code flow");

        let token_url = super::build_url(&self.spotify_client.accounts_base_url, ACCOUNTS_API_TOKEN_PATH);
        let response = self
            .http_client
            .post(token_url)
            .header(
                header::AUTHORIZATION,
                super::build_authorization_header(&self.spotify_client.client_id, &self.spotify_client.client_secret),
            )
            .form(&self.build_authorization_code_token_request_form(code))
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = super::extract_authentication_error(response).await?;
        let token_response: AuthorizeUserTokenResponse = response.json().await.map_err(map_transport_error)?;

        Ok(self.build_client(token_response))
    }

    fn build_client(self, token_response: AuthorizeUserTokenResponse) -> AuthorizationCodeUserClient {
        debug!(
            "Got {} token for authorization code flow with scope {:?}, expiring in {} seconds",
            token_response.token_type, token_response.scope, token_response.expires_in
        );

        AuthorizationCodeUserClient {
            inner: Arc::new(AuthorizationCodeUserClientRef {
                access_token: token_response.access_token,
                refresh_token: token_response.refresh_token,
                expires_in: token_response.expires_in,
            }),
            api_base_url: self.spotify_client.api_base_url.clone(),
            http_client: self.http_client,
        }
    }
}

impl AuthorizationCodeUserClientBuilder {
    pub(super) fn new(redirect_uri: String, spotify_client: Arc<SpotifyClientRef>, http_client: AsyncClient) -> Self {
        Self {
            spotify_client,
            redirect_uri,
            scopes: None,
            show_dialog: false,

            http_client,
        }
    }

    /// Specify the [OAuth authorization scopes](crate::scope::Scope) that the user is asked to grant for the
    /// application.
    pub fn scopes<T>(self, scopes: T) -> Self
    where
        T: ToScopesString,
    {
        Self {
            scopes: Some(scopes.to_scopes_string()),
            ..self
        }
    }

    /// Set whether or not to force the user to approve the application again, if they've already done so.
    ///
    /// If false (default), a user who has already approved the application is automatically redirected to the specified
    /// redirect URL. If true, the user will not be automatically redirected and will have to approve the application
    /// again.
    pub fn show_dialog(self, show_dialog: bool) -> Self {
        Self { show_dialog, ..self }
    }

    /// Finalize the builder and return an [IncompleteAuthorizationCodeUserClient].
    pub fn build(self) -> IncompleteAuthorizationCodeUserClient {
        IncompleteAuthorizationCodeUserClient {
            spotify_client: self.spotify_client,
            redirect_uri: self.redirect_uri,
            scopes: self.scopes,
            show_dialog: self.show_dialog,

            http_client: self.http_client,
        }
    }
}

impl crate::private::Sealed for AuthorizationCodeUserClient {}

impl private::BuildHttpRequest for AuthorizationCodeUserClient {
    fn build_http_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .bearer_auth(self.inner.access_token.as_str())
    }

    fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }
}

#[async_trait::async_trait]
impl super::ScopedClient for AuthorizationCodeUserClient {}

#[async_trait::async_trait]
impl super::UnscopedClient for AuthorizationCodeUserClient {}

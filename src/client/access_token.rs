use std::sync::Arc;

use reqwest::{Client as AsyncClient, Method, Url};

use super::private;

/// A client that authenticates to the Web API with a user access token it was handed, as a bearer token.
///
/// The client cannot refresh the token. Once it expires, every request fails with
/// [AccessTokenExpired](crate::Error::AccessTokenExpired) and the user has to log in again.
///
/// Implements all the [scoped](crate::client::ScopedClient) and [unscoped endpoints](crate::client::UnscopedClient).
#[derive(Clone)]
pub struct AccessTokenUserClient {
    access_token: Arc<str>,
    api_base_url: Url,
    http_client: AsyncClient,
}

impl AccessTokenUserClient {
    pub(super) fn new(access_token: String, api_base_url: Url, http_client: AsyncClient) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url,
            http_client,
        }
    }
}

impl std::fmt::Debug for AccessTokenUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenUserClient")
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url.as_str())
            .finish()
    }
}

impl crate::private::Sealed for AccessTokenUserClient {}

impl private::BuildHttpRequest for AccessTokenUserClient {
    fn build_http_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http_client.request(method, url).bearer_auth(&*self.access_token)
    }

    fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }
}

#[async_trait::async_trait]
impl super::ScopedClient for AccessTokenUserClient {}

#[async_trait::async_trait]
impl super::UnscopedClient for AccessTokenUserClient {}

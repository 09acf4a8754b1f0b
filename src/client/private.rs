use log::{error, trace, warn};
use reqwest::{header, header::HeaderMap, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{map_transport_error, Error, Result},
    model::error::{extract_error_message, ApiErrorMessage, ApiErrorResponse},
};

/// Every user client implements this trait.
pub trait BuildHttpRequest: crate::private::Sealed {
    /// Returns a new [RequestBuilder](reqwest::RequestBuilder) with any necessary information (e.g. authentication
    /// headers) filled in. You probably shouldn't call this function directly; instead use
    /// [send_http_request](BuildHttpRequest::send_http_request).
    fn build_http_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder;

    fn api_base_url(&self) -> &Url;

    /// Returns the URL of a Web API endpoint given as path segments relative to the API base URL.
    fn api_url(&self, segments: &[&str]) -> Url {
        super::build_url(self.api_base_url(), segments)
    }

    fn send_http_request(&self, method: Method, url: Url) -> PrivateRequestBuilder<'_, Self, ()> {
        PrivateRequestBuilder {
            client: self,
            method,
            url,
            body: None,
        }
    }
}

pub struct PrivateRequestBuilder<'a, C, B>
where
    C: ?Sized,
    B: Serialize + Send,
{
    client: &'a C,
    method: Method,
    url: Url,
    body: Option<B>,
}

impl<'a, C, B> PrivateRequestBuilder<'a, C, B>
where
    C: ?Sized,
    B: Serialize + Send,
{
    pub fn body<T>(self, body: T) -> PrivateRequestBuilder<'a, C, T>
    where
        T: Serialize + Send,
    {
        PrivateRequestBuilder {
            client: self.client,
            method: self.method,
            url: self.url,
            body: Some(body),
        }
    }

    pub fn query<I, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: AsRef<str>,
    {
        let pairs: Vec<_> = pairs.into_iter().collect();

        // query_pairs_mut leaves a trailing '?' behind even if nothing is appended
        if !pairs.is_empty() {
            self.url
                .query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(key, value)| (*key, value.as_ref())));
        }

        self
    }
}

impl<'a, C, B> PrivateRequestBuilder<'a, C, B>
where
    C: BuildHttpRequest + ?Sized,
    B: Serialize + Send,
{
    /// Sends the request and returns the response if its status is successful. Every unsuccessful status is turned into
    /// an error; nothing is retried.
    pub async fn send_async(self) -> Result<reqwest::Response> {
        trace!("{} {}", self.method, self.url);
        let mut request = self.client.build_http_request(self.method.clone(), self.url);

        if let Some(body) = &self.body {
            request = request.json(body);
        // Spotify requires that all empty POST and PUT have a Content-Length header set to 0. reqwest doesn't do it
        // so we have to do it ourselves
        } else if self.method == Method::POST || self.method == Method::PUT {
            request = request.header(header::CONTENT_LENGTH, header::HeaderValue::from_static("0"));
        }

        let response = request.send().await.map_err(map_transport_error)?;
        trace!("Response: {:?}", response);

        handle_response_status(response).await
    }

    /// Sends the request and deserializes the response body.
    pub async fn send_json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send_async().await?;
        response.json().await.map_err(map_transport_error)
    }
}

async fn handle_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = extract_rate_limit_retry_after(response.headers())?;
        warn!("Got rate limited by Spotify, retry after {retry_after} seconds");
        return Err(Error::RateLimit(retry_after));
    }

    let body = response.text().await.map_err(map_transport_error)?;

    match status {
        StatusCode::UNAUTHORIZED => {
            warn!("Got 401 Unauthorized response: {body}");

            match serde_json::from_str::<ApiErrorResponse>(&body).map(|response| response.error.message) {
                Ok(ApiErrorMessage::TokenExpired) => Err(Error::AccessTokenExpired),
                Ok(ApiErrorMessage::PermissionsMissing) => Err(Error::MissingScope),
                Ok(ApiErrorMessage::Other(message)) => Err(Error::Unauthorized(message)),
                Err(_) => Err(Error::Unauthorized(response_message(status, &body))),
            }
        }

        StatusCode::FORBIDDEN => {
            error!("Got 403 Forbidden response: {body}");
            Err(Error::Forbidden(response_message(status, &body)))
        }

        other => {
            error!("Got {other} response: {body}");
            Err(Error::UnhandledSpotifyError(other.as_u16(), response_message(other, &body)))
        }
    }
}

fn response_message(status: StatusCode, body: &str) -> String {
    extract_error_message(body).unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_owned())
}

fn extract_rate_limit_retry_after(headers: &HeaderMap) -> Result<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|header| header.to_str().ok())
        .and_then(|header_str| header_str.parse::<u64>().ok())
        .ok_or_else(|| {
            warn!("Invalid rate-limit response");
            Error::InvalidRateLimitResponse
        })
}

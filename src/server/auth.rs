//! The OAuth login redirect and callback. These handlers only ever answer with `302 Found` redirects; errors are
//! reported to the frontend in the redirect URL, never as a JSON body.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use url::{form_urlencoded, Url};

use super::AppState;
use crate::{
    client::{AuthorizationCodeUserClient, IncompleteAuthorizationCodeUserClient},
    config::Config,
    scope::LOGIN_SCOPES,
};

/// Why a login failed, as reported to the frontend in the `error` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// The callback had no authorization code.
    NoCode,
    /// Exchanging the code for tokens failed.
    AuthFailed,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl LoginFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            LoginFailure::NoCode => "no_code",
            LoginFailure::AuthFailed => "auth_failed",
        }
    }
}

/// GET /login
pub async fn login(State(state): State<AppState>) -> Response {
    let authorize_url = authorization_client(&state).get_authorize_url();
    debug!("Redirecting to Spotify authorization: {authorize_url}");

    found(authorize_url)
}

/// GET /callback
pub async fn callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    let code = match params.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => {
            match params.error.as_deref() {
                Some(reason) => warn!("Spotify authorization was not granted: {reason}"),
                None => warn!("Callback called without an authorization code"),
            }

            return found(failure_redirect(&state.config, LoginFailure::NoCode));
        }
    };

    match authorization_client(&state).finalize(code).await {
        Ok(client) => {
            info!("Authorization code exchanged for tokens");
            found(success_redirect(&state.config, &client))
        }
        Err(err) => {
            error!("Failed to exchange authorization code: {err}");
            found(failure_redirect(&state.config, LoginFailure::AuthFailed))
        }
    }
}

fn authorization_client(state: &AppState) -> IncompleteAuthorizationCodeUserClient {
    state
        .spotify
        .authorization_code_client(state.config.redirect_uri.as_str())
        .scopes(LOGIN_SCOPES)
        .show_dialog(state.config.show_dialog)
        .build()
}

/// The frontend URL a successful login redirects to. The tokens are in the fragment so they never reach a server log.
pub fn success_redirect(config: &Config, client: &AuthorizationCodeUserClient) -> String {
    let mut url = success_url(config);
    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", client.access_token())
        .append_pair("refresh_token", client.refresh_token())
        .append_pair("expires_in", &client.expires_in().to_string())
        .finish();

    url.set_fragment(Some(&fragment));
    url.into()
}

pub fn failure_redirect(config: &Config, failure: LoginFailure) -> String {
    let mut url = config.frontend_uri.clone();
    url.query_pairs_mut().append_pair("error", failure.as_str());
    url.into()
}

fn success_url(config: &Config) -> Url {
    config
        .frontend_uri
        .join(config.frontend_success_path.trim_start_matches('/'))
        .unwrap_or_else(|_| config.frontend_uri.clone())
}

// axum's Redirect helpers answer 303 or 307; the OAuth flow redirects with 302
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    error::Error,
    generator::{PipelineError, PipelineStep},
};

/// Errors returned by the JSON endpoints. Each becomes a `{success: false, error, code}` envelope with a matching
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing access token")]
    MissingToken,
    #[error("Missing vibe")]
    MissingVibe,
    #[error("At least one of seed_tracks, seed_artists or seed_genres is required")]
    MissingSeed,
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        code: &'static str,
        #[source]
        source: Error,
    },
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: String,
    code: &'a str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::MissingVibe | ApiError::MissingSeed | ApiError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::NoTracksFound) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(PipelineError::Step {
                step: PipelineStep::ResolveIdentity,
                source,
            }) => match source {
                Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::UNAUTHORIZED,
            },
            ApiError::Pipeline(PipelineError::Step { source, .. }) | ApiError::Upstream { source, .. } => {
                upstream_status(source)
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingToken => "missing_token",
            ApiError::MissingVibe => "missing_vibe",
            ApiError::MissingSeed => "missing_seed",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Pipeline(err) => err.code(),
            ApiError::Upstream { code, .. } => *code,
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::Pipeline(PipelineError::Step {
                source: Error::RateLimit(secs),
                ..
            })
            | ApiError::Upstream {
                source: Error::RateLimit(secs),
                ..
            } => Some(*secs),
            _ => None,
        }
    }
}

/// The status reported for a failed Spotify call outside the identity step.
fn upstream_status(err: &Error) -> StatusCode {
    match err {
        Error::AccessTokenExpired | Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::Forbidden(_) | Error::MissingScope => StatusCode::FORBIDDEN,
        Error::RateLimit(_) | Error::InvalidRateLimitResponse => StatusCode::TOO_MANY_REQUESTS,
        Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Responding {status} ({code}): {message}");
        } else {
            warn!("Responding {status} ({code}): {message}");
        }

        let body = Json(ErrorEnvelope {
            success: false,
            error: message,
            code,
        });

        match self.retry_after() {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

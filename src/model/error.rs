use serde::{de::Visitor, Deserialize};

use crate::error::Error;

/// Error body the accounts service returns for a failed token request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct AuthenticationErrorResponse {
    pub error: AuthenticationErrorKind,
    #[serde(default)]
    pub error_description: String,
}

/// Error body the Web API returns for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiError {
    pub status: u16,
    pub message: ApiErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub(crate) enum ApiErrorMessage {
    PermissionsMissing,
    TokenExpired,

    Other(String),
}

impl AuthenticationErrorResponse {
    pub fn into_error(self) -> Error {
        match self.error {
            AuthenticationErrorKind::InvalidGrant => Error::InvalidAuthorizationCode,
            AuthenticationErrorKind::InvalidClient => Error::InvalidClient,
            kind => Error::UnhandledAuthenticationError(kind, self.error_description),
        }
    }
}

impl ApiErrorMessage {
    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorMessage::PermissionsMissing => "Permissions missing",
            ApiErrorMessage::TokenExpired => "The access token expired",
            ApiErrorMessage::Other(message) => message,
        }
    }
}

impl<'de> Deserialize<'de> for ApiErrorMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SpotifyErrorMessageVisitor;

        impl<'de> Visitor<'de> for SpotifyErrorMessageVisitor {
            type Value = ApiErrorMessage;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_string(v.to_owned())
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v.as_str() {
                    "Permissions missing" => Ok(ApiErrorMessage::PermissionsMissing),
                    "The access token expired" | "Token expired" => Ok(ApiErrorMessage::TokenExpired),

                    _ => Ok(ApiErrorMessage::Other(v)),
                }
            }
        }

        deserializer.deserialize_str(SpotifyErrorMessageVisitor)
    }
}

/// Extracts a human-readable message from an error response body: the Web API's error message if the body is one,
/// otherwise the trimmed body text. Returns `None` for an empty body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(response) = serde_json::from_str::<ApiErrorResponse>(body) {
        return Some(response.error.message.as_str().to_owned());
    }

    let body = body.trim();
    (!body.is_empty()).then(|| body.to_owned())
}

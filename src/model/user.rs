//! The current user's profile.

use serde::{Deserialize, Serialize};

use super::{ExternalUrls, Image};

/// The profile of the user the access token belongs to, as returned by the `me` endpoint.
///
/// `email` is only present if the user granted the `user-read-email` scope, and `country` and `product` only if they
/// granted `user-read-private`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl CurrentUser {
    /// The display name if the user has one, otherwise their ID.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

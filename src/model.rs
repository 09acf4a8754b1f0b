//! Serde models for the Spotify objects the relay reads and writes.
//!
//! Only the fields the relay needs are modelled. Everything else in Spotify's responses is ignored when deserializing.

pub mod error;
pub mod playlist;
pub mod track;
pub mod user;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

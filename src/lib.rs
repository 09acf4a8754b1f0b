//! Vibelist is a small relay between a browser frontend and the [Spotify Web API](https://developer.spotify.com/documentation/web-api).
//!
//! It logs users in with Spotify's authorization code flow and turns a free-text "vibe" into a private playlist of
//! recommended tracks. The relay holds no state besides its configuration: access tokens are handed to the frontend
//! after login and sent back with every request.
//!
//! The crate is split into:
//!
//! - [client]: an asynchronous Spotify client. [SpotifyClient](client::SpotifyClient) performs the authorization code
//!   flow and hands out user clients implementing the [ScopedClient](client::ScopedClient) and
//!   [UnscopedClient](client::UnscopedClient) endpoint traits.
//! - [model]: the Spotify objects the relay reads and writes.
//! - [mood]: the keyword table that maps a vibe to a target valence.
//! - [generator]: the playlist generation pipeline.
//! - [server]: the axum HTTP server.
//! - [config]: the environment-based configuration.
//!
//! # Crate features
//!
//! - `native-tls` (default): use the platform's native TLS implementation through reqwest.
//! - `rustls-tls`: use rustls through reqwest instead. Disable default features when enabling this.

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod mood;
pub mod scope;
pub mod server;

pub use crate::error::{Error, Result};

/// Re-exports the endpoint traits, so their functions can be called on any user client.
pub mod prelude {
    pub use crate::client::{ScopedClient, UnscopedClient};
}

mod private {
    pub trait Sealed {}
}

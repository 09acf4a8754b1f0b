//! The relay's HTTP surface: an axum router over the Spotify client and the generation pipeline.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /login` | [auth::login] |
//! | `GET /callback` | [auth::callback] |
//! | `POST /generate-playlist` | [playlist::generate] |
//! | `GET /recommendations` | [playlist::recommendations] |
//! | `POST /create-playlist` | [playlist::create] |
//! | `POST /discard-playlist` | [playlist::discard] |
//! | `GET /` | landing page |
//!
//! Any other path is served from the configured static directory. Cross-origin requests are only allowed from the
//! configured frontend's origin.

pub mod auth;
pub mod error;
pub mod playlist;

pub use self::error::ApiError;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use log::{error, info};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{client::SpotifyClient, config::Config};

const LANDING_PAGE: &str = include_str!("../assets/landing.html");

/// State shared by every handler. Cloned per request; both fields are reference counted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: SpotifyClient,
    allowed_origin: HeaderValue,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build the Spotify client: {0}")]
    Spotify(#[from] crate::Error),
    #[error("Frontend origin {0} is not a valid header value")]
    InvalidOrigin(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let origin = config.frontend_origin();
        let allowed_origin = HeaderValue::from_str(&origin).map_err(|_| ServerError::InvalidOrigin(origin))?;
        let spotify = config.spotify_client()?;

        Ok(Self {
            config: Arc::new(config),
            spotify,
            allowed_origin,
        })
    }
}

/// Builds the complete router with CORS and static file delivery.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(landing))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/generate-playlist", post(playlist::generate))
        .route("/recommendations", get(playlist::recommendations))
        .route("/create-playlist", post(playlist::create))
        .route("/discard-playlist", post(playlist::discard))
        .fallback_service(static_files)
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let addr = config.socket_addr();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

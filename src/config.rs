//! Process-wide configuration, read once from the environment at startup.
//!
//! A `.env` file in the working directory is loaded into the environment by the binary before the configuration is
//! read. Only the three Spotify application settings are required; everything else has a default.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use thiserror::Error;
use url::Url;

use crate::{
    client::{SpotifyClient, SpotifyClientBuilder, DEFAULT_ACCOUNTS_BASE_URL, DEFAULT_API_BASE_URL},
    generator::PlaylistSettings,
    model::track::MAX_RECOMMENDATION_LIMIT,
    mood::{self, MoodTable},
};

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "SPOTIFY_REDIRECT_URI";
pub const API_BASE_URL_VAR: &str = "SPOTIFY_API_BASE_URL";
pub const ACCOUNTS_BASE_URL_VAR: &str = "SPOTIFY_ACCOUNTS_BASE_URL";
pub const FRONTEND_URI_VAR: &str = "FRONTEND_URI";
pub const FRONTEND_SUCCESS_PATH_VAR: &str = "FRONTEND_SUCCESS_PATH";
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
pub const PORT_VAR: &str = "PORT";
pub const STATIC_DIR_VAR: &str = "STATIC_DIR";
pub const UPSTREAM_TIMEOUT_VAR: &str = "UPSTREAM_TIMEOUT_SECS";
pub const SHOW_DIALOG_VAR: &str = "SHOW_DIALOG";
pub const PLAYLIST_NAME_PREFIX_VAR: &str = "PLAYLIST_NAME_PREFIX";
pub const SEED_GENRE_VAR: &str = "SEED_GENRE";
pub const RECOMMENDATION_LIMIT_VAR: &str = "RECOMMENDATION_LIMIT";
pub const MOOD_RULES_VAR: &str = "MOOD_RULES";
pub const DEFAULT_VALENCE_VAR: &str = "DEFAULT_VALENCE";

const DEFAULT_FRONTEND_URI: &str = "http://localhost:3000";
const DEFAULT_FRONTEND_SUCCESS_PATH: &str = "/";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {variable}: {reason}")]
    Invalid { variable: &'static str, reason: String },
}

/// The relay's configuration. Built once in `main` and shared read-only with every request.
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub frontend_uri: Url,
    pub frontend_success_path: String,
    pub bind_address: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    pub upstream_timeout: Duration,
    pub show_dialog: bool,
    pub playlist: PlaylistSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup. Variables that are set but empty count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let frontend_uri = parse_var(FRONTEND_URI_VAR, get(FRONTEND_URI_VAR), DEFAULT_FRONTEND_URI, |value| {
            Url::parse(value)
                .map_err(|err| err.to_string())
                .and_then(|url| match url.origin() {
                    url::Origin::Tuple(..) => Ok(url),
                    url::Origin::Opaque(_) => Err(String::from("the URI has no origin")),
                })
        })?;

        let recommendation_limit = parse_var(
            RECOMMENDATION_LIMIT_VAR,
            get(RECOMMENDATION_LIMIT_VAR),
            "20",
            |value| match value.parse::<u32>() {
                Ok(limit) if (1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) => Ok(limit),
                _ => Err(format!("expected a number between 1 and {MAX_RECOMMENDATION_LIMIT}")),
            },
        )?;

        let mood_rules: MoodTable = parse_var(MOOD_RULES_VAR, get(MOOD_RULES_VAR), "happy=0.8", |value| {
            value.parse().map_err(|err: mood::MoodRuleError| err.to_string())
        })?;

        let default_valence = parse_var(DEFAULT_VALENCE_VAR, get(DEFAULT_VALENCE_VAR), "0.5", |value| {
            mood::parse_valence(value).map_err(|err| err.to_string())
        })?;

        Ok(Self {
            client_id: require(CLIENT_ID_VAR)?,
            client_secret: require(CLIENT_SECRET_VAR)?,
            redirect_uri: require(REDIRECT_URI_VAR)?,
            api_base_url: get(API_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            accounts_base_url: get(ACCOUNTS_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_ACCOUNTS_BASE_URL.to_owned()),
            frontend_uri,
            frontend_success_path: get(FRONTEND_SUCCESS_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_FRONTEND_SUCCESS_PATH.to_owned()),
            bind_address: parse_var(
                BIND_ADDRESS_VAR,
                get(BIND_ADDRESS_VAR),
                &Ipv4Addr::UNSPECIFIED.to_string(),
                |value| value.parse::<IpAddr>().map_err(|err| err.to_string()),
            )?,
            port: parse_var(PORT_VAR, get(PORT_VAR), &DEFAULT_PORT.to_string(), |value| {
                value.parse::<u16>().map_err(|err| err.to_string())
            })?,
            static_dir: PathBuf::from(get(STATIC_DIR_VAR).unwrap_or_else(|| DEFAULT_STATIC_DIR.to_owned())),
            upstream_timeout: parse_var(
                UPSTREAM_TIMEOUT_VAR,
                get(UPSTREAM_TIMEOUT_VAR),
                &DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string(),
                |value| match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(String::from("expected a positive number of seconds")),
                },
            )?,
            show_dialog: parse_var(SHOW_DIALOG_VAR, get(SHOW_DIALOG_VAR), "false", parse_bool)?,
            playlist: PlaylistSettings {
                name_prefix: get(PLAYLIST_NAME_PREFIX_VAR).unwrap_or_else(|| String::from("Vibelist")),
                seed_genre: get(SEED_GENRE_VAR).unwrap_or_else(|| String::from("pop")),
                recommendation_limit,
                mood: mood_rules.with_default_valence(default_valence),
            },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// The frontend's origin (scheme, host and port), which is the only origin allowed by CORS.
    pub fn frontend_origin(&self) -> String {
        self.frontend_uri.origin().ascii_serialization()
    }

    /// Builds the shared Spotify client with the configured credentials, base URLs and timeout.
    pub fn spotify_client(&self) -> crate::Result<SpotifyClient> {
        SpotifyClientBuilder::new(&self.client_id, &self.client_secret)
            .api_base_url(&self.api_base_url)
            .accounts_base_url(&self.accounts_base_url)
            .timeout(self.upstream_timeout)
            .build()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base_url", &self.api_base_url)
            .field("accounts_base_url", &self.accounts_base_url)
            .field("frontend_uri", &self.frontend_uri.as_str())
            .field("frontend_success_path", &self.frontend_success_path)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("show_dialog", &self.show_dialog)
            .field("playlist", &self.playlist)
            .finish()
    }
}

fn parse_var<T, F>(variable: &'static str, value: Option<String>, default: &str, parse: F) -> Result<T, ConfigError>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parse(value.as_deref().unwrap_or(default)).map_err(|reason| ConfigError::Invalid { variable, reason })
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("expected a boolean, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (CLIENT_ID_VAR, "client"),
        (CLIENT_SECRET_VAR, "secret"),
        (REDIRECT_URI_VAR, "http://localhost:3001/callback"),
    ];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.client_id, "client");
        assert_eq!(config.redirect_uri, "http://localhost:3001/callback");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.accounts_base_url, DEFAULT_ACCOUNTS_BASE_URL);
        assert_eq!(config.frontend_origin(), "http://localhost:3000");
        assert_eq!(config.frontend_success_path, "/");
        assert_eq!(config.socket_addr(), "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert!(!config.show_dialog);
        assert_eq!(config.playlist.name_prefix, "Vibelist");
        assert_eq!(config.playlist.seed_genre, "pop");
        assert_eq!(config.playlist.recommendation_limit, 20);
        assert_eq!(config.playlist.mood, MoodTable::default());
    }

    #[test]
    fn missing_credentials() {
        let err = Config::from_lookup(lookup(&[(CLIENT_ID_VAR, "client")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_SECRET_VAR)));

        let err = Config::from_lookup(lookup(&[(CLIENT_ID_VAR, "  "), (CLIENT_SECRET_VAR, "secret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_ID_VAR)));
    }

    #[test]
    fn overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (FRONTEND_URI_VAR, "https://vibes.example.com:8443/app"),
            (BIND_ADDRESS_VAR, "127.0.0.1"),
            (PORT_VAR, "8080"),
            (SHOW_DIALOG_VAR, "yes"),
            (MOOD_RULES_VAR, "sad=0.2,happy=0.9"),
            (DEFAULT_VALENCE_VAR, "0.4"),
            (RECOMMENDATION_LIMIT_VAR, "50"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.frontend_origin(), "https://vibes.example.com:8443");
        assert_eq!(config.socket_addr(), "127.0.0.1:8080".parse().unwrap());
        assert!(config.show_dialog);
        assert_eq!(config.playlist.recommendation_limit, 50);
        assert_eq!(config.playlist.mood.target_valence("sad and happy"), 0.2);
        assert_eq!(config.playlist.mood.target_valence("neutral"), 0.4);
    }

    #[test]
    fn invalid_values() {
        for (variable, value) in [
            (PORT_VAR, "not-a-port"),
            (RECOMMENDATION_LIMIT_VAR, "101"),
            (DEFAULT_VALENCE_VAR, "2"),
            (MOOD_RULES_VAR, "happy:0.8"),
            (UPSTREAM_TIMEOUT_VAR, "0"),
            (FRONTEND_URI_VAR, "not a uri"),
            (BIND_ADDRESS_VAR, "localhost"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((variable, value));

            match Config::from_lookup(lookup(&vars)) {
                Err(ConfigError::Invalid { variable: invalid, .. }) => assert_eq!(invalid, variable),
                other => panic!("expected {variable}={value} to be invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");

        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"secret\""));
    }
}

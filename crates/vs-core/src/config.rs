//! Application configuration types.
//!
//! The root [`Config`] is deserialized from JSON. Every section defaults
//! sensibly, so an empty `{}` file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Filename of the poster used when a source has no mapping.
pub const DEFAULT_POSTER_KEY: &str = "BigBuckBunny.mp4";

/// Poster stored under [`DEFAULT_POSTER_KEY`] in the built-in table.
pub const DEFAULT_POSTER_URL: &str = "https://peach.blender.org/wp-content/uploads/bbb-splash.png";

/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365 * 10;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub player: PlayerConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, missing, or unparsable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Apply a `PORT` value taken from the environment, if it parses.
    pub fn apply_port_override(&mut self, port: Option<&str>) {
        let Some(raw) = port else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.server.port = port,
            Err(e) => tracing::warn!("Ignoring invalid PORT value {raw:?}: {e}"),
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.cors_origins.is_empty() {
            warnings.push("server.cors_origins is empty; browsers will be refused".into());
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            warnings.push(format!(
                "auth.bcrypt_cost {} is outside the supported range 4..=31",
                self.auth.bcrypt_cost
            ));
        }

        if self.auth.token_ttl_hours == 0 {
            warnings.push("auth.token_ttl_hours is 0; issued tokens expire immediately".into());
        } else if self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            warnings.push(format!(
                "auth.token_ttl_hours {} exceeds {MAX_TOKEN_TTL_HOURS}; logins will fail",
                self.auth.token_ttl_hours
            ));
        }

        let default_poster = self.player.posters.get(&self.player.default_poster_key);
        if default_poster.map_or(true, |url| url.trim().is_empty()) {
            warnings.push(format!(
                "player.default_poster_key '{}' has no entry in player.posters",
                self.player.default_poster_key
            ));
        }

        let empty: Vec<&str> = self
            .player
            .posters
            .iter()
            .filter(|(_, url)| url.trim().is_empty())
            .map(|(file, _)| file.as_str())
            .collect();
        if !empty.is_empty() {
            warnings.push(format!(
                "player.posters has empty URLs for {}; they use the default poster",
                empty.join(", ")
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Built frontend to serve for any unmatched route.
    pub static_dir: Option<PathBuf>,
    /// Origins allowed by CORS (credentials are allowed for these).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 9090,
            db_path: PathBuf::from("./data/vidstream.db"),
            static_dir: None,
            cors_origins: vec![
                "http://localhost:3000".into(),
                "https://localhost:3000".into(),
            ],
        }
    }
}

/// Account and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: 24,
            bcrypt_cost: 12,
            min_password_len: 6,
        }
    }
}

/// Playback session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Delay before the "loaded" status is hidden.
    pub status_hide_delay_ms: u64,
    /// Delay before the single network-error retry.
    pub retry_delay_ms: u64,
    /// Source filename -> poster image URL.
    pub posters: BTreeMap<String, String>,
    /// Key of the poster used when a filename has no mapping.
    pub default_poster_key: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            status_hide_delay_ms: 2000,
            retry_delay_ms: 3000,
            posters: default_posters(),
            default_poster_key: DEFAULT_POSTER_KEY.into(),
        }
    }
}

/// The built-in poster table (Blender open movies).
pub fn default_posters() -> BTreeMap<String, String> {
    [
        (DEFAULT_POSTER_KEY, DEFAULT_POSTER_URL),
        (
            "ElephantsDream.mp4",
            "https://orange.blender.org/wp-content/themes/orange/images/media/gallery/s5_proog_emo.jpg",
        ),
        (
            "Sintel.mp4",
            "https://durian.blender.org/wp-content/uploads/2010/06/05_comp_000272.jpg",
        ),
        (
            "TearsOfSteel.mp4",
            "https://mango.blender.org/wp-content/uploads/2013/05/01_thom_celia_bridge.jpg",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

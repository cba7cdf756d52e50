//! Filename -> poster image lookup.

use std::collections::BTreeMap;

use vs_core::config::{default_posters, PlayerConfig, DEFAULT_POSTER_KEY, DEFAULT_POSTER_URL};

/// Static table mapping a source's filename to its cover image.
///
/// Resolution never yields an empty poster: unknown filenames get the
/// fallback entry.
#[derive(Debug, Clone)]
pub struct PosterTable {
    entries: BTreeMap<String, String>,
    fallback: String,
}

impl PosterTable {
    /// Build a table whose fallback is the entry stored under `default_key`.
    ///
    /// If `default_key` has no entry the built-in Big Buck Bunny poster is used.
    /// Entries with an empty URL are dropped, so those filenames fall back too.
    pub fn new(mut entries: BTreeMap<String, String>, default_key: &str) -> Self {
        entries.retain(|file, url| {
            let keep = !url.trim().is_empty();
            if !keep {
                tracing::warn!(file = %file, "Ignoring empty poster entry");
            }
            keep
        });
        let fallback = match entries.get(default_key) {
            Some(url) => url.clone(),
            _ => {
                tracing::warn!(
                    default_key,
                    "Default poster key has no entry; using built-in poster"
                );
                DEFAULT_POSTER_URL.to_string()
            }
        };
        Self { entries, fallback }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.posters.clone(), &config.default_poster_key)
    }

    /// Exact lookup by filename.
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(String::as_str)
    }

    /// Poster for a source URL, falling back to the default entry.
    pub fn resolve(&self, url: &str) -> &str {
        self.get(file_name(url)).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for PosterTable {
    fn default() -> Self {
        Self::new(default_posters(), DEFAULT_POSTER_KEY)
    }
}

/// Last `/`-separated segment of a URL.
pub fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

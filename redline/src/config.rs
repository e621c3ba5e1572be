//! Engine configuration.
//!
//! A small TOML file tunes the guard debounce and the diff algorithm.
//! Loading is soft-fail throughout: a missing or unparseable file yields the
//! defaults, and parse errors are reported on stderr rather than aborting —
//! a bad config must never take the engine down.

use std::path::{Path, PathBuf};
use std::time::Duration;

use redline_core::Algorithm;
use serde::Deserialize;

/// Tunables for the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Guard debounce in milliseconds — long enough for the engine's own
    /// render to settle, short enough that stray edits are reverted before
    /// the user types much more. Default: 10.
    pub debounce_ms: u64,
    /// Diff algorithm: `"myers"` (default), `"patience"`, or `"lcs"`.
    pub algorithm: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { debounce_ms: 10, algorithm: "myers".to_owned() }
    }
}

impl EngineConfig {
    /// The guard debounce as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Maps the configured algorithm name to `similar`'s algorithm.
    ///
    /// Unrecognised names fall back to Myers.
    pub fn algorithm(&self) -> Algorithm {
        match self.algorithm.as_str() {
            "patience" => Algorithm::Patience,
            "lcs" => Algorithm::Lcs,
            _ => Algorithm::Myers,
        }
    }

    /// Returns the path to the redline config file.
    ///
    /// Prefers `$XDG_CONFIG_HOME/redline/config.toml`; falls back to
    /// `~/.config/redline/config.toml` when the env var is absent.
    pub fn config_path() -> PathBuf {
        let base = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
            .unwrap_or_else(|| PathBuf::from(".config"));
        base.join("redline").join("config.toml")
    }

    /// Loads the config from the default location. Never panics.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Loads the config from `path`.
    ///
    /// Returns the defaults if the file does not exist or cannot be parsed.
    /// Parse errors are soft failures printed to stderr.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("redline: config parse error in {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

//! Configuration loading and config file resolution
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `FLOW_CONFIG` environment variable
//! 3. `<user config dir>/flow/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged
//! and compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FLOW_CONFIG";

/// Default User-Agent for outbound catalog requests
pub const DEFAULT_USER_AGENT: &str = "Flow/0.1.0 ( https://github.com/flow-playlists/flow )";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Enrichment (remote catalog) configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Sequencing defaults
    #[serde(default)]
    pub sequencing: SequencingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// What to do when enriching a single item fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole pipeline and surface the error
    Abort,
    /// Treat the failed attribute as empty and continue
    #[default]
    Empty,
}

impl std::str::FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "empty" => Ok(FailurePolicy::Empty),
            other => Err(Error::Config(format!(
                "Unknown enrichment failure policy '{}' (expected 'abort' or 'empty')",
                other
            ))),
        }
    }
}

/// Remote catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// User-Agent sent with every request (required by MusicBrainz)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// MusicBrainz web service base URL
    #[serde(default = "default_musicbrainz_url")]
    pub musicbrainz_url: String,

    /// AcousticBrainz API base URL
    #[serde(default = "default_acousticbrainz_url")]
    pub acousticbrainz_url: String,

    /// Embedding service base URL (text-embeddings-inference compatible)
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,

    /// Minimum spacing between MusicBrainz requests
    #[serde(default = "default_musicbrainz_spacing_ms")]
    pub musicbrainz_spacing_ms: u64,

    /// Minimum spacing between AcousticBrainz requests
    #[serde(default = "default_acousticbrainz_spacing_ms")]
    pub acousticbrainz_spacing_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Failure policy for a single item
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            musicbrainz_url: default_musicbrainz_url(),
            acousticbrainz_url: default_acousticbrainz_url(),
            embedding_url: default_embedding_url(),
            musicbrainz_spacing_ms: default_musicbrainz_spacing_ms(),
            acousticbrainz_spacing_ms: default_acousticbrainz_spacing_ms(),
            timeout_secs: default_timeout_secs(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Sequencing defaults (overridable from the command line)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencingConfig {
    /// Strategy key ("tag-overlap", "embedding" or "mood")
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Keep consecutive items by the same primary author apart
    #[serde(default)]
    pub separate_authors: bool,

    /// Apply the coarse valence banding pass before fine banding
    #[serde(default = "default_true")]
    pub coarse_banding: bool,

    /// Maximum items per coarse band
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum valence spread of a fine band
    #[serde(default = "default_band_width")]
    pub band_width: f64,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            separate_authors: false,
            coarse_banding: true,
            chunk_size: default_chunk_size(),
            band_width: default_band_width(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_musicbrainz_url() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}

fn default_acousticbrainz_url() -> String {
    "https://acousticbrainz.org/api/v1".to_string()
}

fn default_embedding_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_musicbrainz_spacing_ms() -> u64 {
    1100
}

fn default_acousticbrainz_spacing_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_strategy() -> String {
    "tag-overlap".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    30
}

fn default_band_width() -> f64 {
    0.1
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration with graceful degradation
    ///
    /// Returns compiled defaults when no file is found or the file cannot
    /// be read or parsed.
    pub fn load_or_default(resolver: &ConfigResolver) -> Self {
        let Some(path) = resolver.resolve() else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Validate value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.sequencing.chunk_size == 0 {
            return Err(Error::Config("sequencing.chunk_size must be at least 1".to_string()));
        }
        let width = self.sequencing.band_width;
        if !width.is_finite() || width < 0.0 {
            return Err(Error::Config(format!(
                "sequencing.band_width must be a non-negative number, got {}",
                width
            )));
        }
        if self.enrichment.timeout_secs == 0 {
            return Err(Error::Config("enrichment.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Config file path resolver
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve the config file to load, if any
    ///
    /// Explicit paths (command line, environment) are returned even when the
    /// file does not exist so that the load step can warn about them. The
    /// per-user default is only returned when present.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config file
        default_config_path().filter(|p| p.exists())
    }
}

/// Platform config file location: `<config dir>/flow/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flow").join("config.toml"))
}

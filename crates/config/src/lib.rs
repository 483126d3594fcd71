//! Configuration loading, validation, and management for workmatch.
//!
//! Loads configuration from `~/.workmatch/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.workmatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session life-cycle settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Clue merging settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Scoring and banding settings
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Candidate store settings
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session expires
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,

    /// How long a completed session lingers before cleanup removes it
    #[serde(default = "default_completed_grace_minutes")]
    pub completed_grace_minutes: u64,

    /// Period of the background cleanup sweep
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_ttl_minutes() -> u64 {
    30
}
fn default_completed_grace_minutes() -> u64 {
    5
}
fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
            completed_grace_minutes: default_completed_grace_minutes(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// How much more confident a new extraction must be to replace a filled slot
    #[serde(default = "default_confidence_margin")]
    pub confidence_margin: f32,

    /// The extractor's neutral priority value, never treated as stated
    #[serde(default = "default_priority_placeholder")]
    pub priority_placeholder: String,
}

fn default_confidence_margin() -> f32 {
    0.1
}
fn default_priority_placeholder() -> String {
    "일반작업".into()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            confidence_margin: default_confidence_margin(),
            priority_placeholder: default_priority_placeholder(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates scoring at or below this are noise
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Results returned per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Above this many matches the caller should ask for an item id
    #[serde(default = "default_overflow_limit")]
    pub overflow_limit: usize,

    /// Rows requested from the candidate store per query
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Bonus for matching well on every scored field
    #[serde(default = "default_completeness_bonus")]
    pub completeness_bonus: f32,

    /// Per-field similarity every field must exceed to earn the bonus
    #[serde(default = "default_bonus_threshold")]
    pub bonus_threshold: f32,
}

fn default_min_score() -> f32 {
    0.2
}
fn default_page_size() -> usize {
    5
}
fn default_overflow_limit() -> usize {
    15
}
fn default_fetch_limit() -> usize {
    50
}
fn default_completeness_bonus() -> f32 {
    0.10
}
fn default_bonus_threshold() -> f32 {
    0.8
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            page_size: default_page_size(),
            overflow_limit: default_overflow_limit(),
            fetch_limit: default_fetch_limit(),
            completeness_bonus: default_completeness_bonus(),
            bonus_threshold: default_bonus_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "jsonl", "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Records file or database path (defaults under the config dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "jsonl".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// The configured path, or the backend's default file under the config dir.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None if self.backend == "sqlite" => AppConfig::config_dir().join("work_history.db"),
            None => AppConfig::config_dir().join("work_history.jsonl"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.workmatch/config.toml).
    ///
    /// Environment variables override file values:
    /// - `WORKMATCH_STORE_BACKEND`
    /// - `WORKMATCH_STORE_PATH`
    /// - `WORKMATCH_SESSION_TTL_MINUTES`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(backend) = std::env::var("WORKMATCH_STORE_BACKEND") {
            self.store.backend = backend;
        }

        if let Ok(path) = std::env::var("WORKMATCH_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }

        if let Ok(ttl) = std::env::var("WORKMATCH_SESSION_TTL_MINUTES") {
            self.session.ttl_minutes = ttl.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "WORKMATCH_SESSION_TTL_MINUTES must be a whole number of minutes, got {ttl:?}"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".workmatch")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.ttl_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "session.ttl_minutes must be > 0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.merge.confidence_margin) {
            return Err(ConfigError::ValidationError(
                "merge.confidence_margin must be between 0.0 and 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ranking.min_score) {
            return Err(ConfigError::ValidationError(
                "ranking.min_score must be between 0.0 and 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ranking.completeness_bonus)
            || !(0.0..=1.0).contains(&self.ranking.bonus_threshold)
        {
            return Err(ConfigError::ValidationError(
                "ranking.completeness_bonus and ranking.bonus_threshold must be between 0.0 and 1.0"
                    .into(),
            ));
        }

        if self.ranking.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.page_size must be > 0".into(),
            ));
        }

        if self.ranking.overflow_limit < self.ranking.page_size {
            return Err(ConfigError::ValidationError(
                "ranking.overflow_limit must be >= ranking.page_size".into(),
            ));
        }

        match self.store.backend.as_str() {
            "jsonl" | "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "store.backend must be one of jsonl, sqlite, memory (got {other:?})"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

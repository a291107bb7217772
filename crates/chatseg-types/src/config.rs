//! Configuration loading for chatseg.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/chatseg/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Time-gap strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapConfig {
    /// Largest gap (seconds) allowed between neighbours in one window
    #[serde(default = "default_gap_seconds")]
    pub max_gap_seconds: i64,
}

fn default_gap_seconds() -> i64 {
    120
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            max_gap_seconds: default_gap_seconds(),
        }
    }
}

impl GapConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_gap_seconds < 0 {
            return Err(format!(
                "max_gap_seconds must be >= 0, got {}",
                self.max_gap_seconds
            ));
        }
        Ok(())
    }
}

/// Reply-chain strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyChainConfig {
    /// Maximum parent lookups per chain walk
    #[serde(default = "default_max_chain_hops")]
    pub max_chain_hops: usize,

    /// Greedily drop windows sharing a message with an accepted window
    #[serde(default = "default_true")]
    pub non_overlapping: bool,
}

fn default_max_chain_hops() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for ReplyChainConfig {
    fn default() -> Self {
        Self {
            max_chain_hops: default_max_chain_hops(),
            non_overlapping: default_true(),
        }
    }
}

/// Hybrid (session split + learned scoring) strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Gap (seconds) that starts a new coarse session
    #[serde(default = "default_session_gap_seconds")]
    pub max_gap_seconds: i64,

    /// Minimum cohesion probability for a window to be selected
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Path to the vectorizer artifact
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: String,

    /// Path to the classifier artifact
    #[serde(default = "default_classifier_path")]
    pub classifier_path: String,
}

fn default_session_gap_seconds() -> i64 {
    15 * 60
}

fn default_threshold() -> f64 {
    0.7
}

fn default_vectorizer_path() -> String {
    "models/tfidf_feat.json".to_string()
}

fn default_classifier_path() -> String {
    "models/window_classifier.json".to_string()
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            max_gap_seconds: default_session_gap_seconds(),
            threshold: default_threshold(),
            vectorizer_path: default_vectorizer_path(),
            classifier_path: default_classifier_path(),
        }
    }
}

impl HybridConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold must be 0.0-1.0, got {}", self.threshold));
        }
        if self.max_gap_seconds < 0 {
            return Err(format!(
                "max_gap_seconds must be >= 0, got {}",
                self.max_gap_seconds
            ));
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Messages per topic window, shared by every strategy
    #[serde(default = "default_topic_size")]
    pub topic_size: usize,

    #[serde(default)]
    pub gap: GapConfig,

    #[serde(default)]
    pub reply_chain: ReplyChainConfig,

    #[serde(default)]
    pub hybrid: HybridConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_topic_size() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            topic_size: default_topic_size(),
            gap: GapConfig::default(),
            reply_chain: ReplyChainConfig::default(),
            hybrid: HybridConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/chatseg/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CHATSEG_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "chatseg")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("topic_size", default_topic_size() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("gap.max_gap_seconds", default_gap_seconds())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("hybrid.threshold", default_threshold())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: CHATSEG_TOPIC_SIZE, CHATSEG_HYBRID__THRESHOLD, ...
        builder = builder.add_source(
            Environment::with_prefix("CHATSEG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.topic_size < 1 {
            return Err(TypesError::Config(format!(
                "topic_size must be >= 1, got {}",
                self.topic_size
            )));
        }
        self.gap.validate().map_err(TypesError::Config)?;
        self.hybrid.validate().map_err(TypesError::Config)?;
        Ok(())
    }
}

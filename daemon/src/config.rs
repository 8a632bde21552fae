//! CLI configuration with TOML file support.

use presence_services::extraction::{DEFAULT_EXTRACTION_MODEL, DEFAULT_EXTRACTION_URL};
use presence_services::geolocation::DEFAULT_GEOLOCATION_URL;
use presence_utils::LogFormat;
use presence_verification::identity::DEFAULT_MODEL;
use presence_verification::pipeline::DEFAULT_RADIUS_M;
use presence_verification::{PipelineConfig, ThresholdMode, DEFAULT_RSSI_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Configuration for the `presence` CLI.
///
/// Can be loaded from a TOML file via [`PresenceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Allowed registrar-to-claimant distance when a request names none, in meters.
    #[serde(default = "default_radius_m")]
    pub default_radius_m: f64,

    /// Face-embedding model the identity stage is calibrated for.
    #[serde(default = "default_face_model")]
    pub face_model: String,

    #[serde(default)]
    pub threshold_mode: ThresholdMode,

    /// RSSI threshold for beacon registrations that do not name one, in dBm.
    #[serde(default = "default_rssi_threshold")]
    pub default_rssi_threshold: i32,

    /// Base URL of the face matching service. Unset means identity never verifies.
    #[serde(default)]
    pub face_match_url: Option<String>,

    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,

    /// OpenAI-compatible chat-completions endpoint for document extraction.
    #[serde(default = "default_extraction_url")]
    pub extraction_url: String,

    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Timeout for every outbound HTTP request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_radius_m() -> f64 {
    DEFAULT_RADIUS_M
}

fn default_face_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_rssi_threshold() -> i32 {
    DEFAULT_RSSI_THRESHOLD
}

fn default_geolocation_url() -> String {
    DEFAULT_GEOLOCATION_URL.to_string()
}

fn default_extraction_url() -> String {
    DEFAULT_EXTRACTION_URL.to_string()
}

fn default_extraction_model() -> String {
    DEFAULT_EXTRACTION_MODEL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PresenceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_radius_m.is_finite() || self.default_radius_m <= 0.0 {
            return Err(ConfigError::Parse(format!(
                "default_radius_m must be positive, got {}",
                self.default_radius_m
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Parse("http_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            face_model: self.face_model.clone(),
            threshold_mode: self.threshold_mode,
            default_radius_m: self.default_radius_m,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
            face_model: default_face_model(),
            threshold_mode: ThresholdMode::default(),
            default_rssi_threshold: default_rssi_threshold(),
            face_match_url: None,
            geolocation_url: default_geolocation_url(),
            extraction_url: default_extraction_url(),
            extraction_model: default_extraction_model(),
            http_timeout_secs: default_http_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

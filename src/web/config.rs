use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::presentation::DEFAULT_OVERLAY_OPACITY;
use crate::receivers::RADIUS_TOLERANCE_M;
use crate::session::SessionSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid duration: {0}")]
    Duration(#[from] humantime::DurationError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub elevation: Option<ElevationConfig>,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Sent as the `Cookie` header, for backends that keep the transmitter
    /// per login session.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_timeout() -> String {
    "20s".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElevationConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tilt_debounce")]
    pub tilt_debounce: String,
    #[serde(default = "default_radius_tolerance")]
    pub radius_tolerance_m: f64,
    #[serde(default = "default_move_threshold")]
    pub move_threshold_m: f64,
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tilt_debounce: default_tilt_debounce(),
            radius_tolerance_m: default_radius_tolerance(),
            move_threshold_m: default_move_threshold(),
            overlay_opacity: default_overlay_opacity(),
        }
    }
}

fn default_tilt_debounce() -> String {
    "350ms".to_string()
}

fn default_radius_tolerance() -> f64 {
    RADIUS_TOLERANCE_M
}

fn default_move_threshold() -> f64 {
    0.5
}

fn default_overlay_opacity() -> f64 {
    DEFAULT_OVERLAY_OPACITY
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        // Surface bad durations at startup rather than on first use.
        config.backend_timeout()?;
        config.session_settings()?;
        Ok(config)
    }

    pub fn backend_timeout(&self) -> Result<Duration, ConfigError> {
        Ok(humantime::parse_duration(&self.backend.timeout)?)
    }

    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            tilt_debounce: humantime::parse_duration(&self.session.tilt_debounce)?,
            radius_tolerance_m: self.session.radius_tolerance_m,
            move_threshold_m: self.session.move_threshold_m,
        })
    }
}

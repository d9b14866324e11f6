use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::selector::BackendPreference;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default duration for smooth transitions, in milliseconds
    pub fade_duration_ms: u64,

    /// Backend to use on Linux: probe automatically, or force one
    pub backend: BackendPreference,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: 300,
            backend: BackendPreference::Auto,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or the default location.
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(p),
            None => default_config_path()?,
        };

        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.general.fade_duration_ms)
    }
}

/// Default config location under the platform config directory
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine config directory")?;
    Ok(dir.join("system-volume").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.fade_duration_ms, 300);
        assert_eq!(config.general.backend, BackendPreference::Auto);
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [general]
            fade_duration_ms = 750
            backend = "pipewire"
            "#,
        )
        .unwrap();
        assert_eq!(config.fade_duration(), Duration::from_millis(750));
        assert_eq!(config.general.backend, BackendPreference::Pipewire);
    }

    #[test]
    fn partial_general_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            backend = "alsa"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.fade_duration_ms, 300);
        assert_eq!(config.general.backend, BackendPreference::Alsa);
    }
}

//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Player and trim editor settings.
    #[serde(default)]
    pub player: PlayerDefaults,

    /// Timeline thumbnail strip settings.
    #[serde(default)]
    pub thumbnails: ThumbnailDefaults,

    /// Export dispatch settings.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Playback parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerDefaults {
    /// Upper bound for the position tick (Hz).
    pub refresh_hz: u32,

    /// Minimum distance between the trim handles, in seconds of media.
    pub min_trim_gap_secs: f64,

    /// Delay before the second forced pause of an external blur.
    pub blur_repause_delay_ms: u64,

    /// Initial volume in `[0.0, 1.0]`.
    pub default_volume: f64,
}

/// Thumbnail strip parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailDefaults {
    /// Number of evenly spaced thumbnails in the strip.
    pub count: usize,

    /// Raster size of each thumbnail.
    pub width: u32,
    pub height: u32,

    /// A seek that takes longer than this abandons the run.
    pub seek_timeout_ms: u64,
}

/// Export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Hard limit on waiting for the render service's terminal event.
    pub timeout_secs: u64,

    /// Lifetime of the signed download location.
    pub download_ttl_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trimline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            min_trim_gap_secs: 1.0,
            blur_repause_delay_ms: 150,
            default_volume: 1.0,
        }
    }
}

impl Default for ThumbnailDefaults {
    fn default() -> Self {
        Self {
            count: 10,
            width: 160,
            height: 90,
            seek_timeout_ms: 5_000,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            download_ttl_secs: 3_600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl PlayerDefaults {
    pub fn blur_repause_delay(&self) -> Duration {
        Duration::from_millis(self.blur_repause_delay_ms)
    }
}

impl ThumbnailDefaults {
    pub fn seek_timeout(&self) -> Duration {
        Duration::from_millis(self.seek_timeout_ms)
    }
}

impl ExportDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_ttl(&self) -> Duration {
        Duration::from_secs(self.download_ttl_secs)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("trimline").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_player_contract() {
        let config = AppConfig::default();
        assert_eq!(config.thumbnails.count, 10);
        assert_eq!(config.export.timeout_secs, 60);
        assert!((config.player.min_trim_gap_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"export":{"timeout_secs":5}}"#).unwrap();
        assert_eq!(config.export.timeout_secs, 5);
        assert_eq!(config.export.download_ttl_secs, 3_600);
        assert_eq!(config.player.refresh_hz, 60);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("trimline_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.thumbnails.count = 12;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.thumbnails.count, 12);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("trimline_test_bad_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.thumbnails.count, 10);

        std::fs::remove_dir_all(&dir).ok();
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::models::QualityTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds of audio the preloader tries to keep buffered ahead.
    #[serde(default = "default_preload_buffer")]
    pub preload_buffer_secs: f64,
}

/// Per-tier encoding parameters for the URL transform selector.
///
/// The source database disagreed on these numbers across revisions, so they
/// are policy, not contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierParams {
    pub bitrate_kbps: u32,
    pub sample_rate_hz: u32,
    pub channels: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_low_tier")]
    pub low: TierParams,

    #[serde(default = "default_medium_tier")]
    pub medium: TierParams,

    #[serde(default = "default_high_tier")]
    pub high: TierParams,

    /// Hosts whose URLs accept a transform segment; anything else passes
    /// through the selector untouched.
    #[serde(default = "default_media_hosts")]
    pub media_hosts: Vec<String>,

    /// Container forced by the unsupported-format fallback.
    #[serde(default = "default_fallback_container")]
    pub fallback_container: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the article backend for duration/play telemetry.
    #[serde(default = "default_api_base")]
    pub base_url: String,
}

impl QualityConfig {
    pub fn tier_params(&self, tier: QualityTier) -> &TierParams {
        match tier {
            QualityTier::Low => &self.low,
            QualityTier::Medium => &self.medium,
            QualityTier::High => &self.high,
        }
    }
}

impl PlayerConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: PlayerConfig =
                toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = PlayerConfig::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("articast").join("config.toml"))
    }
}

/// User playback preferences persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default = "default_rate")]
    pub playback_rate: f64,
}

impl PlayerSettings {
    pub fn load() -> Result<Self> {
        let path = Self::settings_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read settings file")?;
            Ok(toml::from_str(&contents).context("Failed to parse settings file")?)
        } else {
            Ok(PlayerSettings::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(&path, contents).context("Failed to write settings file")?;
        debug!("Settings saved to {:?}", path);
        Ok(())
    }

    fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("articast").join("settings.toml"))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            quality: QualityConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            preload_buffer_secs: default_preload_buffer(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            low: default_low_tier(),
            medium: default_medium_tier(),
            high: default_high_tier(),
            media_hosts: default_media_hosts(),
            fallback_container: default_fallback_container(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            playback_rate: default_rate(),
        }
    }
}

// Default value functions
fn default_max_retries() -> u32 {
    constants::DEFAULT_MAX_RETRIES
}
fn default_preload_buffer() -> f64 {
    constants::DEFAULT_PRELOAD_BUFFER_SECS
}
fn default_low_tier() -> TierParams {
    TierParams {
        bitrate_kbps: 24,
        sample_rate_hz: 22_050,
        channels: 1,
    }
}
fn default_medium_tier() -> TierParams {
    TierParams {
        bitrate_kbps: 32,
        sample_rate_hz: 44_100,
        channels: 2,
    }
}
fn default_high_tier() -> TierParams {
    TierParams {
        bitrate_kbps: 48,
        sample_rate_hz: 44_100,
        channels: 2,
    }
}
fn default_media_hosts() -> Vec<String> {
    vec!["res.cloudinary.com".to_string()]
}
fn default_fallback_container() -> String {
    "mp3".to_string()
}
fn default_api_base() -> String {
    "http://localhost:5000".to_string()
}
fn default_volume() -> f64 {
    1.0
}
fn default_rate() -> f64 {
    1.0
}

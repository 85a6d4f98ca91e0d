//! TOML-based application configuration.
//!
//! Stores the user's timer defaults and sound/ducking preferences at
//! `~/.config/ringtimer/config.toml`. Session state (tokens, selected
//! household/group) lives in the key-value store, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::StorageError;
use crate::speaker::ducking::{DEFAULT_DEVICE_DUCK_FRACTION, DEFAULT_DUCK_PERCENT, MAX_DUCK_PERCENT};
use crate::storage::data_dir;
use crate::timer::{CountdownConfig, IntervalConfig};

/// Timer defaults applied when a mode is opened fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerDefaults {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub interval: IntervalConfig,
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            countdown: CountdownConfig::default(),
            interval: IntervalConfig::default(),
        }
    }
}

/// Sound-cue preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Ducking preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuckingConfig {
    /// Speaker group volume while ducked, percent (0-50).
    #[serde(default = "default_duck_percent")]
    pub speaker_duck_percent: u8,
    /// Local output gain multiplier while ducked (0.0-1.0).
    #[serde(default = "default_device_fraction")]
    pub device_duck_fraction: f64,
}

impl Default for DuckingConfig {
    fn default() -> Self {
        Self {
            speaker_duck_percent: DEFAULT_DUCK_PERCENT,
            device_duck_fraction: DEFAULT_DEVICE_DUCK_FRACTION,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_duck_percent() -> u8 {
    DEFAULT_DUCK_PERCENT
}
fn default_device_fraction() -> f64 {
    DEFAULT_DEVICE_DUCK_FRACTION
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ringtimer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerDefaults,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub ducking: DuckingConfig,
}

impl Config {
    fn path() -> Result<PathBuf, StorageError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    pub fn load() -> Result<Self, StorageError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
                Ok(cfg.normalized())
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), StorageError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| StorageError::WriteFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Re-clamp every bounded field. Hand-edited files with out-of-range
    /// values are corrected, not rejected.
    fn normalized(mut self) -> Self {
        self.timer.countdown =
            CountdownConfig::new(self.timer.countdown.minutes, self.timer.countdown.seconds);
        self.timer.interval = IntervalConfig::new(
            self.timer.interval.work_secs,
            self.timer.interval.rest_secs,
            self.timer.interval.rounds,
        );
        self.ducking.speaker_duck_percent =
            self.ducking.speaker_duck_percent.min(MAX_DUCK_PERCENT);
        self.ducking.device_duck_fraction = self.ducking.device_duck_fraction.clamp(0.0, 1.0);
        self
    }
}

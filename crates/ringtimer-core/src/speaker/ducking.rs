//! Volume ducking: temporarily lowering playback volume, then restoring it.
//!
//! One capability interface with interchangeable backends, selected when
//! the shell is composed -- the speaker-group backend when a speaker
//! session exists, the local software-gain backend otherwise. Duck state
//! lives on the backend instance, so concurrent test instances stay
//! isolated.

use crate::speaker::api::SpeakerClient;
use crate::storage::{keys, KeyValueStore};

/// Highest allowed duck level in percent of normal volume.
pub const MAX_DUCK_PERCENT: u8 = 50;
pub const DEFAULT_DUCK_PERCENT: u8 = 20;
/// Default local-output duck fraction (30% of original gain).
pub const DEFAULT_DEVICE_DUCK_FRACTION: f64 = 0.3;

/// A backend that can lower and restore playback volume.
///
/// Both operations are idempotent and fail soft: ducking while already
/// ducked and restoring while not ducked report success without doing
/// anything.
pub trait VolumeDucker {
    /// Lower the volume to `level_percent` of normal. Returns success.
    fn duck(&mut self, level_percent: u8) -> impl std::future::Future<Output = bool> + Send;
    /// Restore the volume remembered by the last successful duck.
    fn restore(&mut self) -> impl std::future::Future<Output = bool> + Send;
    fn is_ducked(&self) -> bool;
}

/// Ducks a speaker group through the control API, remembering the group
/// volume it found so restore puts it back exactly.
#[derive(Debug)]
pub struct GroupDucker<S: KeyValueStore> {
    client: SpeakerClient<S>,
    original_volume: Option<u32>,
    ducked: bool,
}

impl<S: KeyValueStore> GroupDucker<S> {
    pub fn new(client: SpeakerClient<S>) -> Self {
        Self {
            client,
            original_volume: None,
            ducked: false,
        }
    }

    pub fn client(&self) -> &SpeakerClient<S> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut SpeakerClient<S> {
        &mut self.client
    }
}

impl<S: KeyValueStore + Send> VolumeDucker for GroupDucker<S> {
    async fn duck(&mut self, level_percent: u8) -> bool {
        if self.ducked {
            return true;
        }

        let current = match self.client.get_group_volume(None).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "could not read group volume before duck");
                return false;
            }
        };
        self.original_volume = Some(current.volume);

        let level = u32::from(level_percent.min(MAX_DUCK_PERCENT));
        match self.client.set_group_volume(level, None).await {
            Ok(()) => {
                self.ducked = true;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "group duck failed");
                false
            }
        }
    }

    async fn restore(&mut self) -> bool {
        let original = match (self.ducked, self.original_volume) {
            (true, Some(v)) => v,
            _ => return true,
        };

        match self.client.set_group_volume(original, None).await {
            Ok(()) => {
                self.ducked = false;
                self.original_volume = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "group volume restore failed");
                false
            }
        }
    }

    fn is_ducked(&self) -> bool {
        self.ducked
    }
}

/// Local-output fallback: scales a software gain (0.0-1.0) instead of
/// talking to a speaker. The shell applies the gain to whatever audio
/// path the platform offers.
#[derive(Debug)]
pub struct SoftwareGainDucker {
    gain: f64,
    original_gain: Option<f64>,
    ducked: bool,
}

impl SoftwareGainDucker {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            original_gain: None,
            ducked: false,
        }
    }

    /// Current output gain for the shell to apply.
    pub fn gain(&self) -> f64 {
        self.gain
    }
}

impl Default for SoftwareGainDucker {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeDucker for SoftwareGainDucker {
    async fn duck(&mut self, level_percent: u8) -> bool {
        if self.ducked {
            return true;
        }
        self.original_gain = Some(self.gain);
        self.gain *= f64::from(level_percent.min(100)) / 100.0;
        self.ducked = true;
        true
    }

    async fn restore(&mut self) -> bool {
        if !self.ducked {
            return true;
        }
        if let Some(original) = self.original_gain.take() {
            self.gain = original;
        }
        self.ducked = false;
        true
    }

    fn is_ducked(&self) -> bool {
        self.ducked
    }
}

/// Load the persisted local duck fraction, defaulting when absent or
/// unparseable.
pub fn device_duck_fraction(store: &impl KeyValueStore) -> f64 {
    store
        .get(keys::DEVICE_DUCK_LEVEL)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_DEVICE_DUCK_FRACTION)
}

/// Persist the local duck fraction, clamped to 0.0-1.0.
pub fn set_device_duck_fraction(store: &mut impl KeyValueStore, fraction: f64) {
    store.set(
        keys::DEVICE_DUCK_LEVEL,
        &fraction.clamp(0.0, 1.0).to_string(),
    );
}

/// Load the persisted speaker duck level percent, clamped to 0-50.
pub fn speaker_duck_percent(store: &impl KeyValueStore) -> u8 {
    store
        .get(keys::DUCK_LEVEL)
        .and_then(|v| v.parse::<u8>().ok())
        .map(|v| v.min(MAX_DUCK_PERCENT))
        .unwrap_or(DEFAULT_DUCK_PERCENT)
}

/// Persist the speaker duck level percent, clamped to 0-50.
pub fn set_speaker_duck_percent(store: &mut impl KeyValueStore, percent: u8) {
    store.set(keys::DUCK_LEVEL, &percent.min(MAX_DUCK_PERCENT).to_string());
}

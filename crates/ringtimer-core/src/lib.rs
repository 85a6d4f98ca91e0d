//! # Ringtimer Core Library
//!
//! Core logic for the Ringtimer workout timer: the timer state machine
//! and the speaker-control session lifecycle. The UI shell is a thin
//! layer over this crate -- it schedules `tick()`, plays sound cues,
//! renders snapshots and navigates to authorization URLs, but owns no
//! timing or session logic of its own.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine (stopwatch,
//!   countdown, interval) that requires the caller to periodically invoke
//!   `tick()`; elapsed time is derived from an anchor timestamp, never
//!   accumulated per tick
//! - **Auth**: OAuth2 authorization-code session lifecycle for the
//!   speaker integration, with state-nonce CSRF protection and silent
//!   refresh-before-expiry
//! - **Speaker**: control API client (volume, playback, ducking) routed
//!   through a confidential proxy
//! - **Storage**: string-keyed local store plus TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`AuthSessionManager`]: session lifecycle and token refresh
//! - [`SpeakerClient`]: speaker-control surface
//! - [`NotificationBridge`]: forwards snapshots to the platform
//!   notification layer

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod notify;
pub mod speaker;
pub mod storage;
pub mod timer;

pub use auth::{AuthConfig, AuthSessionManager, CallbackParams, SessionStore, TokenSet};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CoreError, OAuthError, SpeakerError, StorageError};
pub use events::{Cue, Event};
pub use notify::{NotificationBridge, NotificationSink};
pub use speaker::{GroupDucker, SoftwareGainDucker, SpeakerClient, VolumeDucker};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use timer::{
    CountdownConfig, IntervalConfig, Phase, TimerEngine, TimerMode, TimerSettings, TimerSnapshot,
    TimerState,
};

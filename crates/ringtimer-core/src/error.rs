//! Core error types for ringtimer-core.
//!
//! Everything in this library fails soft: network and storage faults are
//! converted into these error values at the boundary and surfaced to the
//! caller, never allowed to crash the process.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ringtimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Speaker control API errors
    #[error("Speaker error: {0}")]
    Speaker(#[from] SpeakerError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OAuth-specific errors.
///
/// A failed authorization attempt leaves the stored session untouched;
/// only an explicit logout clears it.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Returned `state` did not match the persisted nonce (possible CSRF).
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// Callback arrived without the required `code`/`state` parameters.
    #[error("Invalid OAuth callback: {0}")]
    CallbackMalformed(String),

    /// Authorization server reported an error (user denied consent).
    #[error("Authorization denied: {0}")]
    ConsentDenied(String),

    /// Token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Operation requiring authentication invoked with no stored session.
    /// This is a normal "not connected" condition, not an exceptional one.
    #[error("No session stored")]
    SessionAbsent,
}

/// Speaker control API errors.
#[derive(Error, Debug)]
pub enum SpeakerError {
    /// No valid access token could be obtained.
    #[error("Not authenticated with the speaker service")]
    NotAuthenticated,

    /// No household has been selected yet.
    #[error("No household selected")]
    NoHousehold,

    /// No speaker group has been selected yet.
    #[error("No speaker group selected")]
    NoGroup,

    /// The proxy or speaker API returned a non-success status.
    #[error("Speaker API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure reaching the proxy.
    #[error("Speaker API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("Unexpected speaker API response: {0}")]
    Decode(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open or create the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Failed to persist the store
    #[error("Failed to write store at {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Store contents could not be parsed
    #[error("Failed to parse store: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

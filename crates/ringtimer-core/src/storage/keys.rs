//! Well-known keys in the local store.

pub const ACCESS_TOKEN: &str = "speaker_access_token";
pub const REFRESH_TOKEN: &str = "speaker_refresh_token";
/// Epoch milliseconds, stored as a decimal string.
pub const TOKEN_EXPIRY: &str = "speaker_token_expiry";
pub const HOUSEHOLD_ID: &str = "speaker_household_id";
pub const GROUP_ID: &str = "speaker_group_id";
/// Speaker duck level in percent (0-50).
pub const DUCK_LEVEL: &str = "speaker_duck_level";
/// Local output duck level as a 0.0-1.0 fraction.
pub const DEVICE_DUCK_LEVEL: &str = "device_duck_level";

//! Persisted speaker-control session.
//!
//! The key-value store is the sole source of truth: nothing here keeps an
//! in-memory copy that could diverge from storage beyond one operation.

use serde::{Deserialize, Serialize};

use crate::storage::{keys, KeyValueStore};

/// The persisted OAuth token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry instant in epoch milliseconds.
    pub expires_at_epoch_ms: u64,
}

/// Typed accessors over the session's slice of the key-value store.
#[derive(Debug)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored token set, or None unless all three fields are present.
    pub fn tokens(&self) -> Option<TokenSet> {
        let access_token = self.store.get(keys::ACCESS_TOKEN)?;
        let refresh_token = self.store.get(keys::REFRESH_TOKEN)?;
        let expires_at_epoch_ms = self.store.get(keys::TOKEN_EXPIRY)?.parse().ok()?;
        Some(TokenSet {
            access_token,
            refresh_token,
            expires_at_epoch_ms,
        })
    }

    pub fn save_tokens(&mut self, tokens: &TokenSet) {
        self.store.set(keys::ACCESS_TOKEN, &tokens.access_token);
        self.store.set(keys::REFRESH_TOKEN, &tokens.refresh_token);
        self.store
            .set(keys::TOKEN_EXPIRY, &tokens.expires_at_epoch_ms.to_string());
    }

    pub fn household_id(&self) -> Option<String> {
        self.store.get(keys::HOUSEHOLD_ID)
    }

    pub fn set_household_id(&mut self, id: &str) {
        self.store.set(keys::HOUSEHOLD_ID, id);
    }

    pub fn group_id(&self) -> Option<String> {
        self.store.get(keys::GROUP_ID)
    }

    pub fn set_group_id(&mut self, id: &str) {
        self.store.set(keys::GROUP_ID, id);
    }

    /// Delete the entire session: tokens and household/group selection.
    pub fn clear(&mut self) {
        for key in [
            keys::ACCESS_TOKEN,
            keys::REFRESH_TOKEN,
            keys::TOKEN_EXPIRY,
            keys::HOUSEHOLD_ID,
            keys::GROUP_ID,
        ] {
            self.store.remove(key);
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

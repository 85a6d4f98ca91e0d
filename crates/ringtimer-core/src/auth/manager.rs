//! OAuth2 authorization-code session lifecycle for the speaker-control
//! integration.
//!
//! The application is a public client: the token exchange is delegated to
//! a confidential proxy over HTTPS, so no client secret lives here.
//!
//! 1. `begin_authorization` stores a random state nonce and returns the
//!    authorization URL for the shell to navigate to
//! 2. `complete_authorization` validates the returned state and exchanges
//!    the code through the proxy
//! 3. `get_valid_access_token` silently refreshes before expiry
//!
//! Every failure is a value, never a panic; a failed attempt leaves the
//! stored session exactly as it was.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::session::{SessionStore, TokenSet};
use crate::error::OAuthError;
use crate::storage::KeyValueStore;

/// Refresh when the stored token has less than this long left to live.
const REFRESH_MARGIN_MS: u64 = 5 * 60 * 1000;

/// Static configuration for the authorization flow.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    /// Authorization server base URL (the login page).
    pub auth_url: String,
    /// Fixed HTTPS callback the authorization server redirects back to.
    pub redirect_uri: String,
    pub scope: String,
    /// Base URL of the confidential token-exchange proxy. The proxy
    /// exposes `/token` and `/refresh`.
    pub proxy_base: String,
}

/// Query parameters delivered to the callback target.
///
/// On platforms without a browser redirect the same values arrive through
/// a custom-URL-scheme handler; [`CallbackParams::from_url`] covers both.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_url(raw: &str) -> Result<Self, OAuthError> {
        let url = Url::parse(raw).map_err(|e| OAuthError::CallbackMalformed(e.to_string()))?;
        let find = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        Ok(Self {
            code: find("code"),
            state: find("state"),
            error: find("error"),
        })
    }
}

/// Wire shape of the proxy's `/token` and `/refresh` responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Absent on refresh means "keep using the previous refresh token".
    refresh_token: Option<String>,
    expires_in: u64,
}

/// Orchestrates the authorization-code flow and owns the persisted session.
#[derive(Debug)]
pub struct AuthSessionManager<S: KeyValueStore> {
    config: AuthConfig,
    session: SessionStore<S>,
    http: reqwest::Client,
    /// The single in-flight state nonce. Consumed on first use,
    /// whatever the validation outcome.
    pending_nonce: Option<String>,
}

impl<S: KeyValueStore> AuthSessionManager<S> {
    pub fn new(config: AuthConfig, store: S) -> Self {
        Self {
            config,
            session: SessionStore::new(store),
            http: reqwest::Client::new(),
            pending_nonce: None,
        }
    }

    /// Generate and stash a state nonce, then build the authorization URL
    /// for the shell to navigate to.
    pub fn begin_authorization(&mut self) -> Result<String, OAuthError> {
        let nonce = generate_state()?;
        self.pending_nonce = Some(nonce.clone());
        Ok(format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(&nonce),
        ))
    }

    /// Validate the callback and exchange the code for tokens.
    ///
    /// The nonce is deleted before validation, so a second attempt with
    /// the same parameters fails even if the first succeeded. Nothing is
    /// persisted unless the exchange succeeds.
    pub async fn complete_authorization(
        &mut self,
        params: &CallbackParams,
    ) -> Result<(), OAuthError> {
        if let Some(reason) = &params.error {
            return Err(OAuthError::ConsentDenied(reason.clone()));
        }
        let (code, state) = match (&params.code, &params.state) {
            (Some(code), Some(state)) => (code, state),
            _ => {
                return Err(OAuthError::CallbackMalformed(
                    "missing code or state parameter".into(),
                ))
            }
        };

        let expected = self.pending_nonce.take().ok_or(OAuthError::StateMismatch)?;
        if *state != expected {
            tracing::warn!("authorization state mismatch, dropping attempt");
            return Err(OAuthError::StateMismatch);
        }

        let response = self
            .http
            .post(format!("{}/token", self.config.proxy_base))
            .json(&json!({
                "code": code,
                "redirect_uri": self.config.redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::TokenExchangeFailed(format!(
                "proxy returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))?;
        let refresh_token = body.refresh_token.ok_or_else(|| {
            OAuthError::TokenExchangeFailed("no refresh token in exchange response".into())
        })?;

        self.session.save_tokens(&TokenSet {
            access_token: body.access_token,
            refresh_token,
            expires_at_epoch_ms: now_ms() + body.expires_in * 1000,
        });
        Ok(())
    }

    /// A usable access token, refreshing first when the stored one has
    /// less than five minutes left. Returns None when not authenticated
    /// or the refresh fails; the stored session is never cleared here.
    pub async fn get_valid_access_token(&mut self) -> Option<String> {
        let tokens = self.session.tokens()?;

        if tokens.expires_at_epoch_ms > now_ms() + REFRESH_MARGIN_MS {
            return Some(tokens.access_token);
        }

        match self.refresh(&tokens).await {
            Ok(new_tokens) => Some(new_tokens.access_token),
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                None
            }
        }
    }

    async fn refresh(&mut self, tokens: &TokenSet) -> Result<TokenSet, OAuthError> {
        let response = self
            .http
            .post(format!("{}/refresh", self.config.proxy_base))
            .json(&json!({ "refresh_token": tokens.refresh_token }))
            .send()
            .await
            .map_err(|e| OAuthError::TokenRefreshFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::TokenRefreshFailed(format!(
                "proxy returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenRefreshFailed(e.to_string()))?;

        // A logout may have raced the request; a late response must not
        // resurrect a cleared session.
        if self.session.tokens().is_none() {
            return Err(OAuthError::TokenRefreshFailed(
                "session cleared while refresh was in flight".into(),
            ));
        }

        let new_tokens = TokenSet {
            access_token: body.access_token,
            refresh_token: body
                .refresh_token
                .unwrap_or_else(|| tokens.refresh_token.clone()),
            expires_at_epoch_ms: now_ms() + body.expires_in * 1000,
        };
        self.session.save_tokens(&new_tokens);
        Ok(new_tokens)
    }

    /// Delete the entire persisted session, selection included.
    pub fn logout(&mut self) {
        self.session.clear();
    }

    /// Cheap synchronous check for UI gating. Never refreshes.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .tokens()
            .is_some_and(|t| t.expires_at_epoch_ms > now_ms())
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.session
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// 32 random bytes, hex-encoded, for the anti-CSRF state parameter.
fn generate_state() -> Result<String, OAuthError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| OAuthError::TokenExchangeFailed(format!("entropy source failed: {e}")))?;
    Ok(hex::encode(bytes))
}

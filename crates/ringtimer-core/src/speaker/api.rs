//! Speaker-control API client.
//!
//! All calls are routed through the confidential proxy (the same host
//! that performs the token exchange), which forwards them to the speaker
//! cloud API with the access token attached. Every operation obtains its
//! token through the session manager, so a silent refresh happens
//! transparently when needed.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthSessionManager;
use crate::error::SpeakerError;
use crate::storage::KeyValueStore;

pub const PLAYBACK_STATE_PLAYING: &str = "PLAYBACK_STATE_PLAYING";

#[derive(Debug, Clone, Deserialize)]
pub struct Household {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playback_state: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GroupVolume {
    pub volume: u32,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub playback_state: String,
}

#[derive(Debug, Deserialize)]
struct HouseholdsResponse {
    #[serde(default)]
    households: Vec<Household>,
}

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<Group>,
}

/// Client for the speaker-control surface.
///
/// Owns the session manager; the UI shell reads and writes the selected
/// household/group through [`SpeakerClient::auth_mut`].
#[derive(Debug)]
pub struct SpeakerClient<S: KeyValueStore> {
    auth: AuthSessionManager<S>,
    http: reqwest::Client,
    proxy_base: String,
}

impl<S: KeyValueStore> SpeakerClient<S> {
    pub fn new(auth: AuthSessionManager<S>, proxy_base: impl Into<String>) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
            proxy_base: proxy_base.into(),
        }
    }

    pub fn auth(&self) -> &AuthSessionManager<S> {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthSessionManager<S> {
        &mut self.auth
    }

    /// Forward one call through the proxy. Returns None for endpoints
    /// that reply with an empty body.
    async fn call(
        &mut self,
        endpoint: &str,
        method: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, SpeakerError> {
        let access_token = self
            .auth
            .get_valid_access_token()
            .await
            .ok_or(SpeakerError::NotAuthenticated)?;

        let response = self
            .http
            .post(format!("{}/api", self.proxy_base))
            .json(&json!({
                "endpoint": endpoint,
                "method": method,
                "body": body,
                "accessToken": access_token,
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%endpoint, status = status.as_u16(), "speaker API call failed");
            return Err(SpeakerError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        if text.is_empty() {
            Ok(None)
        } else {
            serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| SpeakerError::Decode(e.to_string()))
        }
    }

    fn household_or_selected(&self, household_id: Option<&str>) -> Result<String, SpeakerError> {
        household_id
            .map(str::to_string)
            .or_else(|| self.auth.session().household_id())
            .ok_or(SpeakerError::NoHousehold)
    }

    fn group_or_selected(&self, group_id: Option<&str>) -> Result<String, SpeakerError> {
        group_id
            .map(str::to_string)
            .or_else(|| self.auth.session().group_id())
            .ok_or(SpeakerError::NoGroup)
    }

    pub async fn get_households(&mut self) -> Result<Vec<Household>, SpeakerError> {
        let value = self
            .call("/households", "GET", None)
            .await?
            .ok_or_else(|| SpeakerError::Decode("empty households response".into()))?;
        let parsed: HouseholdsResponse =
            serde_json::from_value(value).map_err(|e| SpeakerError::Decode(e.to_string()))?;
        Ok(parsed.households)
    }

    pub async fn get_groups(
        &mut self,
        household_id: Option<&str>,
    ) -> Result<Vec<Group>, SpeakerError> {
        let hid = self.household_or_selected(household_id)?;
        let value = self
            .call(&format!("/households/{hid}/groups"), "GET", None)
            .await?
            .ok_or_else(|| SpeakerError::Decode("empty groups response".into()))?;
        let parsed: GroupsResponse =
            serde_json::from_value(value).map_err(|e| SpeakerError::Decode(e.to_string()))?;
        Ok(parsed.groups)
    }

    pub async fn get_group_volume(
        &mut self,
        group_id: Option<&str>,
    ) -> Result<GroupVolume, SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        let value = self
            .call(&format!("/groups/{gid}/groupVolume"), "GET", None)
            .await?
            .ok_or_else(|| SpeakerError::Decode("empty volume response".into()))?;
        serde_json::from_value(value).map_err(|e| SpeakerError::Decode(e.to_string()))
    }

    /// Set the group volume, clamped to 0-100.
    pub async fn set_group_volume(
        &mut self,
        volume: u32,
        group_id: Option<&str>,
    ) -> Result<(), SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        self.call(
            &format!("/groups/{gid}/groupVolume"),
            "POST",
            Some(json!({ "volume": volume.min(100) })),
        )
        .await?;
        Ok(())
    }

    pub async fn set_relative_volume(
        &mut self,
        volume_delta: i32,
        group_id: Option<&str>,
    ) -> Result<(), SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        self.call(
            &format!("/groups/{gid}/groupVolume/relative"),
            "POST",
            Some(json!({ "volumeDelta": volume_delta.clamp(-100, 100) })),
        )
        .await?;
        Ok(())
    }

    pub async fn set_group_mute(
        &mut self,
        muted: bool,
        group_id: Option<&str>,
    ) -> Result<(), SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        self.call(
            &format!("/groups/{gid}/groupVolume/mute"),
            "POST",
            Some(json!({ "muted": muted })),
        )
        .await?;
        Ok(())
    }

    pub async fn playback_status(
        &mut self,
        group_id: Option<&str>,
    ) -> Result<PlaybackStatus, SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        let value = self
            .call(&format!("/groups/{gid}/playback"), "GET", None)
            .await?
            .ok_or_else(|| SpeakerError::Decode("empty playback response".into()))?;
        serde_json::from_value(value).map_err(|e| SpeakerError::Decode(e.to_string()))
    }

    pub async fn is_playing(&mut self, group_id: Option<&str>) -> Result<bool, SpeakerError> {
        Ok(self.playback_status(group_id).await?.playback_state == PLAYBACK_STATE_PLAYING)
    }

    pub async fn play(&mut self, group_id: Option<&str>) -> Result<(), SpeakerError> {
        self.playback_command("play", group_id).await
    }

    pub async fn pause(&mut self, group_id: Option<&str>) -> Result<(), SpeakerError> {
        self.playback_command("pause", group_id).await
    }

    pub async fn toggle_play_pause(&mut self, group_id: Option<&str>) -> Result<(), SpeakerError> {
        self.playback_command("togglePlayPause", group_id).await
    }

    pub async fn skip_to_next_track(&mut self, group_id: Option<&str>) -> Result<(), SpeakerError> {
        self.playback_command("skipToNextTrack", group_id).await
    }

    pub async fn skip_to_previous_track(
        &mut self,
        group_id: Option<&str>,
    ) -> Result<(), SpeakerError> {
        self.playback_command("skipToPreviousTrack", group_id).await
    }

    async fn playback_command(
        &mut self,
        command: &str,
        group_id: Option<&str>,
    ) -> Result<(), SpeakerError> {
        let gid = self.group_or_selected(group_id)?;
        self.call(&format!("/groups/{gid}/playback/{command}"), "POST", None)
            .await?;
        Ok(())
    }
}

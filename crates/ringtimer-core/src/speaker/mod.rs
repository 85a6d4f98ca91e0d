pub mod api;
pub mod ducking;

pub use api::{Group, GroupVolume, Household, PlaybackStatus, SpeakerClient};
pub use ducking::{GroupDucker, SoftwareGainDucker, VolumeDucker};

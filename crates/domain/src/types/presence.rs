//! Chat presence states and the decisions the classifier can make about them

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Presence as shown by the chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceState {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "away")]
    Away,
    #[serde(rename = "dnd")]
    DoNotDisturb,
    #[serde(rename = "offline")]
    Offline,
}

impl_domain_status_conversions!(PresenceState {
    Online => "online",
    Away => "away",
    DoNotDisturb => "dnd",
    Offline => "offline",
});

/// What should happen to a user's presence after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceDecision {
    Keep,
    SetBusy,
    SetFree,
    SetAway,
}

impl PresenceDecision {
    /// The presence to write, or `None` for [`PresenceDecision::Keep`].
    pub const fn target_state(self) -> Option<PresenceState> {
        match self {
            Self::Keep => None,
            Self::SetBusy => Some(PresenceState::DoNotDisturb),
            Self::SetFree => Some(PresenceState::Online),
            Self::SetAway => Some(PresenceState::Offline),
        }
    }
}

impl_domain_status_conversions!(PresenceDecision {
    Keep => "keep",
    SetBusy => "set_busy",
    SetFree => "set_free",
    SetAway => "set_away",
});

//! Types exchanged with the multiworld session
//!
//! The session itself (server connection, slot data, hints) lives outside
//! this crate. It feeds [`SessionEvent`]s in and consumes
//! [`UpstreamEvent`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::LocationId;

/// Longest slot name the game's UI can display.
pub const SLOT_NAME_MAX_CHARS: usize = 16;
/// Longest seed string the game's UI can display.
pub const SEED_MAX_CHARS: usize = 8;

/// An item sent to this slot by the multiworld server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    pub item: u32,
    pub location: u32,
    pub player: u32,
}

/// Slot and seed shown in game, truncated to what the HUD can fit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotIdentity {
    pub slot_name: String,
    pub seed: String,
}

impl SlotIdentity {
    pub fn new(slot_name: &str, seed: &str) -> Self {
        Self {
            slot_name: slot_name.chars().take(SLOT_NAME_MAX_CHARS).collect(),
            seed: seed.chars().take(SEED_MAX_CHARS).collect(),
        }
    }
}

/// Events flowing from the session into the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Items starting at sequence number `index`, one per consecutive index.
    ReceivedItems { index: u64, items: Vec<NetworkItem> },
    Connected(SlotIdentity),
    Disconnected,
}

/// Events flowing from the game back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    LocationsChecked(Vec<LocationId>),
    GoalCompleted,
}

/// The in-game `connection-status` field (structure version 2 onward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameConnectionStatus {
    Disconnected = 0,
    Wait = 1,
    Ready = 2,
    Failure = 3,
}

impl GameConnectionStatus {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Disconnected),
            1 => Some(Self::Wait),
            2 => Some(Self::Ready),
            3 => Some(Self::Failure),
            _ => None,
        }
    }

    /// Name of the `ap-connection-status` enum member.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Wait => "wait",
            Self::Ready => "ready",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for GameConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//! Raw completion identifiers to multiworld location ids
//!
//! The game writes its own mission enumeration values into the completion
//! arrays. Main missions are offset from the catalog numbering because the
//! engine enumerates a few cutscene-only tasks first; side missions are
//! currently written with their catalog ids. Both catalogs share one
//! location id space, with side missions shifted up by
//! [`SIDE_MISSION_LOCATION_OFFSET`].

use std::fmt;

use serde::Serialize;

use crate::catalog::{self, MissionKind, MissionRecord};
use crate::error::{Error, Result};

/// Distance between the engine's main mission enumeration and the catalog.
pub const MAIN_RAW_ID_OFFSET: u32 = 5;

/// Side mission location ids start above this value.
pub const SIDE_MISSION_LOCATION_OFFSET: u32 = 100;

/// Raw id the game writes once "Destroy Metal Kor at Nest" is complete.
pub const FINAL_BOSS_RAW_ID: u32 = 70;

/// Stable location id used by the multiworld protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocationId(pub u32);

impl LocationId {
    /// Catalog mission this location belongs to.
    pub fn mission(self) -> Option<&'static MissionRecord> {
        if self.0 > SIDE_MISSION_LOCATION_OFFSET {
            catalog::side_mission(self.0 - SIDE_MISSION_LOCATION_OFFSET)
        } else {
            catalog::main_mission(self.0)
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of translating one raw identifier.
#[derive(Debug, Clone, Copy)]
pub struct Translation {
    pub location: LocationId,
    pub mission: &'static MissionRecord,
}

/// Translate a raw identifier read from the completion array of `kind`.
///
/// Identifiers outside the table yield [`Error::UnknownRawIdentifier`];
/// callers drop the event and keep polling.
pub fn translate(kind: MissionKind, raw: u32) -> Result<Translation> {
    let unknown = || Error::UnknownRawIdentifier { kind, raw };

    let catalog_id = match kind {
        MissionKind::Main => raw.checked_sub(MAIN_RAW_ID_OFFSET).ok_or_else(unknown)?,
        MissionKind::Side => raw,
    };
    let mission = catalog::mission(kind, catalog_id).ok_or_else(unknown)?;

    let location = match kind {
        MissionKind::Main => catalog_id,
        MissionKind::Side => catalog_id
            .checked_add(SIDE_MISSION_LOCATION_OFFSET)
            .ok_or_else(unknown)?,
    };

    Ok(Translation {
        location: LocationId(location),
        mission,
    })
}

pub fn is_final_boss(raw: u32) -> bool {
    raw == FINAL_BOSS_RAW_ID
}

//! Static catalogs of missions and items
//!
//! Pure data: names and ids for status output and id translation.

mod items;
mod missions;

use std::fmt;

use serde::Serialize;

pub use items::ITEMS;
pub use missions::{MAIN_MISSIONS, SIDE_MISSIONS};

/// Which completion array a mission is reported through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MissionKind {
    Main,
    Side,
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionKind::Main => write!(f, "main mission"),
            MissionKind::Side => write!(f, "side mission"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionRecord {
    pub id: u32,
    pub name: &'static str,
    pub kind: MissionKind,
}

impl MissionRecord {
    pub const fn new(id: u32, name: &'static str, kind: MissionKind) -> Self {
        Self { id, name, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub id: u32,
    pub name: &'static str,
    /// GOAL symbol passed to `ap-item-received!`.
    pub symbol: &'static str,
}

/// Get a main mission by catalog id
pub fn main_mission(id: u32) -> Option<&'static MissionRecord> {
    MAIN_MISSIONS.iter().find(|m| m.id == id)
}

/// Get a side mission by catalog id
pub fn side_mission(id: u32) -> Option<&'static MissionRecord> {
    SIDE_MISSIONS.iter().find(|m| m.id == id)
}

/// Get a mission of either kind by catalog id
pub fn mission(kind: MissionKind, id: u32) -> Option<&'static MissionRecord> {
    match kind {
        MissionKind::Main => main_mission(id),
        MissionKind::Side => side_mission(id),
    }
}

/// Get an item by its multiworld id
pub fn item_by_id(id: u32) -> Option<&'static ItemRecord> {
    ITEMS.iter().find(|i| i.id == id)
}

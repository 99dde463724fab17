//! Memory Reader agent
//!
//! Attaches to the game, finds the `ap-info-jak2` block and polls its
//! completion arrays. Completed missions accumulate in an ordered,
//! duplicate-free outbox that the orchestrator drains with
//! [`MemoryPoller::take_pending`].
//!
//! Connecting is a chain of short synchronous steps:
//!
//! ```text
//! Disconnected -> Connecting -> ScanningForMarker -> ResolvingPointer
//!              -> VerifyingVersion -> Ready
//! ```
//!
//! Any step can end in `Failed`. A failed liveness probe while `Ready`
//! drops back to `Disconnected`. Leaving either only happens through
//! [`MemoryPoller::request_connect`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use byteorder::{ByteOrder, LE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::MissionKind;
use crate::error::{Error, Result};
use crate::log::LogSink;
use crate::mapping::{self, LocationId};
use crate::memory::scanner::{DEFAULT_MARKER, StructureScanner};
use crate::memory::{MarkerMatch, MemorySource, ProcessProvider, ResolvedBlock};
use crate::offsets::{
    BlockLayout, EXPECTED_MEMORY_VERSION, MAIN_MISSION_SLOTS, SIDE_MISSION_SLOTS, SIZEOF_U32,
};
use crate::session::GameConnectionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    ScanningForMarker,
    ResolvingPointer,
    VerifyingVersion,
    Ready,
    Failed,
}

impl ConnectionState {
    /// Intermediate states that advance on their own.
    pub fn is_connecting(self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::ScanningForMarker | Self::ResolvingPointer | Self::VerifyingVersion
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::ScanningForMarker => "scanning for marker",
            Self::ResolvingPointer => "resolving pointer",
            Self::VerifyingVersion => "verifying version",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub process_name: String,
    pub marker: String,
    pub expected_version: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            process_name: "gk.exe".to_string(),
            marker: String::from_utf8_lossy(DEFAULT_MARKER).into_owned(),
            expected_version: EXPECTED_MEMORY_VERSION,
        }
    }
}

/// Snapshot for `memr status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollerStatus {
    pub state: ConnectionState,
    pub pid: Option<u32>,
    pub block_address: Option<usize>,
    pub padding: Option<usize>,
    pub checked: usize,
    pub reported: usize,
    pub last_location: Option<LocationId>,
    pub game_finished: bool,
    pub game_status: Option<GameConnectionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedMission {
    pub location: LocationId,
    pub kind: MissionKind,
    pub name: &'static str,
}

pub struct MemoryPoller {
    settings: PollerSettings,
    provider: Arc<dyn ProcessProvider>,
    scanner: StructureScanner,
    layout: BlockLayout,
    log: Arc<dyn LogSink>,

    state: ConnectionState,
    source: Option<Box<dyn MemorySource>>,
    marker: Option<MarkerMatch>,
    block: Option<ResolvedBlock>,
    found_version: Option<u32>,
    game_status: Option<GameConnectionStatus>,

    outbox: Vec<LocationId>,
    seen: HashSet<LocationId>,
    outbox_index: usize,
    game_finished: bool,

    warned_unknown: HashSet<(MissionKind, u32)>,
    warned_counters: HashSet<MissionKind>,
}

impl MemoryPoller {
    pub fn new(
        settings: PollerSettings,
        provider: Arc<dyn ProcessProvider>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let scanner = StructureScanner::new(settings.marker.as_bytes(), settings.expected_version);
        let layout = BlockLayout::for_version(settings.expected_version);

        Self {
            settings,
            provider,
            scanner,
            layout,
            log,
            state: ConnectionState::Disconnected,
            source: None,
            marker: None,
            block: None,
            found_version: None,
            game_status: None,
            outbox: Vec::new(),
            seen: HashSet::new(),
            outbox_index: 0,
            game_finished: false,
            warned_unknown: HashSet::new(),
            warned_counters: HashSet::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn game_finished(&self) -> bool {
        self.game_finished
    }

    /// Every location confirmed so far, in the order the game reported them.
    pub fn outbox(&self) -> &[LocationId] {
        &self.outbox
    }

    /// Start (or restart) the connection sequence.
    ///
    /// The outbox survives reconnects; the game keeps its own progress.
    pub fn request_connect(&mut self) {
        if self.state.is_connecting() {
            debug!(state = %self.state, "connect already in progress");
            return;
        }

        self.source = None;
        self.marker = None;
        self.block = None;
        self.found_version = None;
        self.game_status = None;
        self.warned_counters.clear();
        self.transition(ConnectionState::Connecting);
    }

    /// Run one scheduler tick: finish any pending connection steps, then
    /// poll if ready.
    pub fn tick(&mut self) {
        while self.state.is_connecting() {
            self.advance();
        }

        if self.state == ConnectionState::Ready {
            if let Err(e) = self.poll() {
                self.handle_error(ConnectionState::Disconnected, &e);
            }
        }
    }

    /// Perform exactly one connection step.
    pub fn advance(&mut self) {
        let result = match self.state {
            ConnectionState::Connecting => self.attach(),
            ConnectionState::ScanningForMarker => self.scan(),
            ConnectionState::ResolvingPointer => self.resolve(),
            ConnectionState::VerifyingVersion => self.verify(),
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.handle_error(ConnectionState::Failed, &e);
        }
    }

    fn attach(&mut self) -> Result<()> {
        let source = self
            .scanner
            .locate(self.provider.as_ref(), &self.settings.process_name)?;
        debug!(pid = source.pid(), "attached to {}", self.settings.process_name);
        self.source = Some(source);
        self.transition(ConnectionState::ScanningForMarker);
        Ok(())
    }

    fn scan(&mut self) -> Result<()> {
        let source = self.source()?;
        let marker = self.scanner.find_marker(source)?;
        self.marker = Some(marker);
        self.transition(ConnectionState::ResolvingPointer);
        Ok(())
    }

    fn resolve(&mut self) -> Result<()> {
        let source = self.source()?;
        let marker = self.marker.clone().ok_or(Error::NotConnected)?;

        match self.scanner.resolve_pointer(source, &marker) {
            Ok(block) => {
                self.found_version = Some(block.version);
                self.block = Some(block);
            }
            Err(attempts) => match StructureScanner::version_candidate(&attempts) {
                Some(version) => {
                    debug!(version, "no hypothesis matched; found a block of another version");
                    self.found_version = Some(version);
                }
                None => {
                    return Err(Error::PointerResolution {
                        marker_address: marker.address,
                        attempts,
                    })
                }
            },
        }

        self.transition(ConnectionState::VerifyingVersion);
        Ok(())
    }

    fn verify(&mut self) -> Result<()> {
        let expected = self.settings.expected_version;

        let found = match self.block {
            Some(block) => self
                .source()?
                .read_u32(block.address + self.layout.version_offset)?,
            None => self.found_version.unwrap_or_default(),
        };

        if found != expected {
            self.block = None;
            return Err(Error::VersionMismatch { expected, found });
        }

        self.transition(ConnectionState::Ready);
        self.log.success("The Jak II memory reader is ready!");
        Ok(())
    }

    fn poll(&mut self) -> Result<()> {
        let block = self.block.ok_or(Error::NotConnected)?.address;
        let source = self.source.as_deref().ok_or(Error::NotConnected)?;

        source.probe()?;

        let main_count = source.read_u64(block + self.layout.next_main_index)?;
        let side_count = source.read_u64(block + self.layout.next_side_index)?;

        let main_count = clamp(&mut self.warned_counters, MissionKind::Main, main_count, MAIN_MISSION_SLOTS);
        let side_count = clamp(&mut self.warned_counters, MissionKind::Side, side_count, SIDE_MISSION_SLOTS);

        let main_raw = read_ids(source, block + self.layout.main_missions, main_count)?;
        let side_raw = read_ids(source, block + self.layout.side_missions, side_count)?;

        let game_status = match self.layout.connection_status {
            Some(offset) => GameConnectionStatus::from_raw(source.read_u32(block + offset)?),
            None => None,
        };
        self.game_status = game_status;

        for raw in main_raw {
            self.record(MissionKind::Main, raw);
            if mapping::is_final_boss(raw) && !self.game_finished {
                self.game_finished = true;
                self.log.success("Final boss defeated, goal complete!");
            }
        }
        for raw in side_raw {
            self.record(MissionKind::Side, raw);
        }

        Ok(())
    }

    fn record(&mut self, kind: MissionKind, raw: u32) {
        match mapping::translate(kind, raw) {
            Ok(t) => {
                if self.seen.insert(t.location) {
                    info!(location = %t.location, mission = t.mission.name, "mission complete");
                    self.outbox.push(t.location);
                }
            }
            Err(e) => {
                if self.warned_unknown.insert((kind, raw)) {
                    self.log.warn(&format!("Ignoring {}", e));
                } else {
                    debug!("{}", e);
                }
            }
        }
    }

    /// Re-read the version field of the resolved block.
    ///
    /// A failed read or a changed version drops the connection the same
    /// way a failed poll does.
    pub fn test_connection(&mut self) -> Option<u32> {
        let Some(block) = self.block.filter(|_| self.state == ConnectionState::Ready) else {
            self.log
                .error("The memory reader is not connected. Enter 'memr connect' first.");
            return None;
        };

        let expected = self.settings.expected_version;
        let result = self
            .source()
            .and_then(|source| source.read_u32(block.address + self.layout.version_offset))
            .and_then(|found| {
                if found == expected {
                    Ok(found)
                } else {
                    Err(Error::VersionMismatch { expected, found })
                }
            });

        match result {
            Ok(version) => {
                self.log.success(&format!(
                    "Memory test PASSED: structure version {} at {:#x}.",
                    version, block.address
                ));
                Some(version)
            }
            Err(e) => {
                let next = match e {
                    Error::VersionMismatch { .. } => ConnectionState::Failed,
                    _ => ConnectionState::Disconnected,
                };
                self.handle_error(next, &e);
                None
            }
        }
    }

    /// Poll right away and report how many new locations turned up.
    pub fn refresh(&mut self) -> usize {
        if self.state != ConnectionState::Ready {
            self.log
                .error("The memory reader is not connected. Enter 'memr connect' first.");
            return 0;
        }

        let before = self.outbox.len();
        self.tick();
        let found = self.outbox.len() - before;

        self.log.info(&format!(
            "Memory refresh complete: {} locations checked, {} new.",
            self.outbox.len(),
            found
        ));
        found
    }

    /// Locations not yet handed upstream; advances the cursor past them.
    pub fn take_pending(&mut self) -> Vec<LocationId> {
        let pending = self.outbox[self.outbox_index..].to_vec();
        self.outbox_index = self.outbox.len();
        pending
    }

    pub fn status(&self) -> PollerStatus {
        PollerStatus {
            state: self.state,
            pid: self.source.as_ref().map(|s| s.pid()),
            block_address: self.block.map(|b| b.address),
            padding: self.block.map(|b| b.padding),
            checked: self.outbox.len(),
            reported: self.outbox_index,
            last_location: self.outbox.last().copied(),
            game_finished: self.game_finished,
            game_status: self.game_status,
        }
    }

    pub fn mission_report(&self) -> Vec<CompletedMission> {
        self.outbox
            .iter()
            .filter_map(|&location| {
                location.mission().map(|m| CompletedMission {
                    location,
                    kind: m.kind,
                    name: m.name,
                })
            })
            .collect()
    }

    /// Layout the poller reads with.
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    fn source(&self) -> Result<&dyn MemorySource> {
        self.source.as_deref().ok_or(Error::NotConnected)
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!(from = %self.state, to = %next, "memory reader state");
        self.state = next;
    }

    /// Fatal errors stop the agent at `next`; anything else is logged and
    /// the current state kept.
    fn handle_error(&mut self, next: ConnectionState, error: &Error) {
        if error.is_fatal() {
            self.drop_connection(next, error);
        } else {
            debug!(state = %self.state, "ignoring recoverable error: {}", error);
        }
    }

    fn drop_connection(&mut self, next: ConnectionState, error: &Error) {
        self.log.error(&error.diagnostic());
        self.source = None;
        self.block = None;
        self.game_status = None;
        self.transition(next);
    }
}

fn read_ids(source: &dyn MemorySource, address: usize, count: usize) -> Result<Vec<u32>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let bytes = source.read_bytes(address, count * SIZEOF_U32)?;
    Ok(bytes.chunks_exact(SIZEOF_U32).map(LE::read_u32).collect())
}

/// A counter past the array's capacity means a corrupted block; never let
/// it drive reads beyond the structure.
fn clamp(warned: &mut HashSet<MissionKind>, kind: MissionKind, count: u64, capacity: usize) -> usize {
    match usize::try_from(count) {
        Ok(count) if count <= capacity => count,
        _ => {
            if warned.insert(kind) {
                warn!(%kind, count, capacity, "completion counter exceeds array capacity; clamping");
            }
            capacity
        }
    }
}

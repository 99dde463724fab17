//! Structure discovery
//!
//! The mod compiles a marker string into the game binary, immediately
//! followed by a pointer to its `ap-info-jak2` block. The compiler may pad
//! between the two, and we only know the marker's byte length, so the
//! pointer is found by trying each candidate padding in turn and keeping
//! the first one whose target carries the expected version.

use std::fmt;

use tracing::{debug, trace};

use super::pattern;
use super::source::{MemorySource, ProcessProvider};
use crate::error::{Error, Result};

/// Marker compiled into the ArchipelaGOAL mod.
pub const DEFAULT_MARKER: &[u8] = b"ArChIpElAgO_JaK2";

/// Candidate padding between the marker and the pointer, in trial order.
pub const PADDING_HYPOTHESES: [usize; 4] = [0, 1, 4, 8];

/// Versions above this are treated as garbage rather than a real block.
pub const MAX_PLAUSIBLE_VERSION: u32 = 64;

/// Regions are read in windows of this size while scanning.
const SCAN_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Where the marker was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub address: usize,
    /// Length of the variant that matched (with or without terminator).
    pub variant_len: usize,
    pub module: String,
}

impl MarkerMatch {
    /// First byte after the matched marker.
    pub fn end(&self) -> usize {
        self.address + self.variant_len
    }
}

/// A block whose version matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub address: usize,
    pub padding: usize,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    PointerUnreadable,
    NullPointer,
    VersionUnreadable { block: usize },
    VersionFound { block: usize, version: u32 },
}

/// One padding hypothesis and what it led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypothesisAttempt {
    pub padding: usize,
    pub pointer_address: usize,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for HypothesisAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} (pointer at {:#x}): ", self.padding, self.pointer_address)?;
        match &self.outcome {
            AttemptOutcome::PointerUnreadable => write!(f, "pointer unreadable"),
            AttemptOutcome::NullPointer => write!(f, "null pointer"),
            AttemptOutcome::VersionUnreadable { block } => {
                write!(f, "block at {:#x} unreadable", block)
            }
            AttemptOutcome::VersionFound { block, version } => {
                write!(f, "block at {:#x} has version {}", block, version)
            }
        }
    }
}

pub fn format_attempts(attempts: &[HypothesisAttempt]) -> String {
    if attempts.is_empty() {
        return "nothing".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Finds the game process, the marker and the versioned block.
#[derive(Debug, Clone)]
pub struct StructureScanner {
    marker: Vec<u8>,
    expected_version: u32,
}

impl StructureScanner {
    pub fn new(marker: impl Into<Vec<u8>>, expected_version: u32) -> Self {
        Self {
            marker: marker.into(),
            expected_version,
        }
    }

    /// Attach to the process named `process_name`.
    pub fn locate(
        &self,
        provider: &dyn ProcessProvider,
        process_name: &str,
    ) -> Result<Box<dyn MemorySource>> {
        provider.attach(process_name)
    }

    /// Byte sequences to search for: null-terminated first, then bare.
    pub fn marker_variants(&self) -> Vec<Vec<u8>> {
        let bare = self.marker.strip_suffix(b"\0").unwrap_or(&self.marker);
        let mut terminated = bare.to_vec();
        terminated.push(0);
        vec![terminated, bare.to_vec()]
    }

    /// First marker occurrence across the loaded modules.
    pub fn scan_for_marker(&self, source: &dyn MemorySource) -> Option<MarkerMatch> {
        let modules = source.modules();

        for variant in self.marker_variants().into_iter().filter(|v| !v.is_empty()) {
            for module in &modules {
                for region in module.regions.iter().filter(|r| r.is_readable()) {
                    let windows = pattern::chunk_windows(
                        region.start,
                        region.end,
                        SCAN_CHUNK_SIZE,
                        variant.len() - 1,
                    );

                    for (start, len) in windows {
                        let data = match source.read_bytes(start, len) {
                            Ok(data) => data,
                            Err(e) => {
                                trace!(module = module.name(), "skipping window: {}", e);
                                continue;
                            }
                        };

                        if let Some(offset) = pattern::find_first(&data, &variant) {
                            let address = start + offset;
                            debug!(
                                module = module.name(),
                                address = format_args!("{:#x}", address),
                                variant_len = variant.len(),
                                "found marker"
                            );
                            return Some(MarkerMatch {
                                address,
                                variant_len: variant.len(),
                                module: module.name().to_string(),
                            });
                        }
                    }
                }
            }
        }

        None
    }

    /// Like [`scan_for_marker`](Self::scan_for_marker) but fails with
    /// [`Error::MarkerNotFound`].
    pub fn find_marker(&self, source: &dyn MemorySource) -> Result<MarkerMatch> {
        self.scan_for_marker(source)
            .ok_or_else(|| Error::MarkerNotFound {
                marker: String::from_utf8_lossy(&self.marker).into_owned(),
                modules: source.modules().len(),
            })
    }

    /// Follow the pointer after the marker, trying each padding hypothesis.
    ///
    /// On failure every attempt is returned for diagnostics.
    pub fn resolve_pointer(
        &self,
        source: &dyn MemorySource,
        marker: &MarkerMatch,
    ) -> std::result::Result<ResolvedBlock, Vec<HypothesisAttempt>> {
        let mut attempts = Vec::with_capacity(PADDING_HYPOTHESES.len());

        for padding in PADDING_HYPOTHESES {
            let pointer_address = marker.end() + padding;
            let outcome = Self::try_hypothesis(source, pointer_address);

            if let AttemptOutcome::VersionFound { block, version } = outcome {
                if version == self.expected_version {
                    debug!(
                        padding,
                        block = format_args!("{:#x}", block),
                        "resolved memory structure"
                    );
                    return Ok(ResolvedBlock {
                        address: block,
                        padding,
                        version,
                    });
                }
            }

            trace!(padding, ?outcome, "hypothesis rejected");
            attempts.push(HypothesisAttempt {
                padding,
                pointer_address,
                outcome,
            });
        }

        Err(attempts)
    }

    fn try_hypothesis(source: &dyn MemorySource, pointer_address: usize) -> AttemptOutcome {
        let block = match source.read_ptr(pointer_address) {
            Ok(0) => return AttemptOutcome::NullPointer,
            Ok(block) => block,
            Err(_) => return AttemptOutcome::PointerUnreadable,
        };

        match source.read_u32(block) {
            Ok(version) => AttemptOutcome::VersionFound { block, version },
            Err(_) => AttemptOutcome::VersionUnreadable { block },
        }
    }

    /// A plausible version read by a failed resolution, if any.
    ///
    /// Used only to tell the user which structure version the game carries;
    /// the block it came from is never polled.
    pub fn version_candidate(attempts: &[HypothesisAttempt]) -> Option<u32> {
        attempts.iter().find_map(|a| match a.outcome {
            AttemptOutcome::VersionFound { version, .. }
                if (1..=MAX_PLAUSIBLE_VERSION).contains(&version) =>
            {
                Some(version)
            }
            _ => None,
        })
    }
}

impl Default for StructureScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, crate::offsets::EXPECTED_MEMORY_VERSION)
    }
}

//! Error types for the game bridge

use std::time::Duration;

use thiserror::Error;

use crate::catalog::MissionKind;
use crate::memory::scanner::{format_attempts, HypothesisAttempt};

/// Manual steps shown when the game process or its memory went away.
const RESTART_GAME_STEPS: &str = "Please close all open windows and reopen the Jak II client.\n\
If the game and compiler do not restart automatically, please follow these steps:\n\
   Run the OpenGOAL Launcher, click Jak II > Features > Mods > ArchipelaGOAL.\n\
   Then click Advanced > Play in Debug Mode.\n\
   Then click Advanced > Open REPL.\n\
   Then enter 'memr connect' and 'repl connect' in the client.";

/// Manual steps shown when the game runs but its memory cannot be opened.
const ATTACH_STEPS: &str = "Please follow these steps:\n\
   Make sure the client runs as the same user as the game.\n\
   On Linux, reading another process may be blocked by ptrace restrictions;\n\
   check /proc/sys/kernel/yama/ptrace_scope or start the client with the needed permissions.\n\
   Then restart the game and enter 'memr connect' in the client.";

/// Manual steps shown when the mod build does not match this client.
const RECOMPILE_STEPS: &str = "Please follow these steps:\n\
   Run the OpenGOAL Launcher, click Jak II > Features > Mods > ArchipelaGOAL.\n\
   Click Update (if one is available).\n\
   Click Advanced > Compile. When this is done, click Continue.\n\
   Click Versions and verify the latest version is marked 'Active'.\n\
   Close all launchers, games, clients, and console windows, then restart the client.";

/// Manual steps shown when the marker or its pointer cannot be found.
const DEBUG_MODE_STEPS: &str = "Please follow these steps:\n\
   If the game is running, try entering 'memr connect' in the client.\n\
   You should see 'The Jak II memory reader is ready!'\n\
   If that did not work, or the game is not running, run the OpenGOAL Launcher.\n\
   Click Jak II > Features > Mods > ArchipelaGOAL.\n\
   Then click Advanced > Play in Debug Mode.\n\
   Try entering 'memr connect' in the client again.";

/// Manual steps shown when the compiler REPL is unreachable or misbehaving.
const REPL_STEPS: &str = "Please follow these steps:\n\
   Make sure the game is running in debug mode.\n\
   Run the OpenGOAL Launcher, click Jak II > Features > Mods > ArchipelaGOAL.\n\
   Then click Advanced > Open REPL and wait for the compiler prompt.\n\
   Then enter 'repl connect' in the client.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not find the {0} process")]
    ProcessNotFound(String),

    #[error("could not open the memory of process {pid}: {reason}")]
    Attach { pid: u32, reason: String },

    #[error("failed to read {size} bytes at {address:#x}: {reason}")]
    MemoryRead {
        address: usize,
        size: usize,
        reason: String,
    },

    #[error("marker {marker:?} not found in any of the {modules} loaded modules")]
    MarkerNotFound { marker: String, modules: usize },

    #[error(
        "could not resolve the memory structure pointer after the marker at {marker_address:#x}; tried: {}",
        format_attempts(.attempts)
    )]
    PointerResolution {
        marker_address: usize,
        attempts: Vec<HypothesisAttempt>,
    },

    #[error("the memory structure is incompatible with this client (expected version {expected}, found version {found})")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("unknown raw {kind} identifier {raw}")]
    UnknownRawIdentifier { kind: MissionKind, raw: u32 },

    #[error("no response from the REPL within {0:?}")]
    TransportTimeout(Duration),

    #[error("unexpected REPL greeting: {0:?}")]
    GreetingMismatch(String),

    #[error("the REPL closed the connection without responding")]
    EmptyResponse,

    #[error("not connected to the REPL")]
    NotConnected,

    #[error("REPL I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{count} items starting at index {index} run past the last item index")]
    ItemIndexOverflow { index: u64, count: usize },

    #[error("the {0} agent has stopped")]
    AgentStopped(&'static str),
}

impl Error {
    /// Whether this error stops the owning agent at `Failed`/`Disconnected`.
    ///
    /// Unknown identifiers and timeouts are absorbed where they happen.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::UnknownRawIdentifier { .. } | Error::TransportTimeout(_)
        )
    }

    /// The manual next step for a fatal error, if there is one.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Error::ProcessNotFound(_) | Error::MemoryRead { .. } => Some(RESTART_GAME_STEPS),
            Error::MarkerNotFound { .. } | Error::PointerResolution { .. } => {
                Some(DEBUG_MODE_STEPS)
            }
            Error::Attach { .. } => Some(ATTACH_STEPS),
            Error::VersionMismatch { .. } => Some(RECOMPILE_STEPS),
            Error::GreetingMismatch(_)
            | Error::EmptyResponse
            | Error::NotConnected
            | Error::Io(_) => Some(REPL_STEPS),
            Error::UnknownRawIdentifier { .. }
            | Error::TransportTimeout(_)
            | Error::ItemIndexOverflow { .. }
            | Error::AgentStopped(_) => None,
        }
    }

    /// The error message followed by its remediation steps.
    pub fn diagnostic(&self) -> String {
        match self.remediation() {
            Some(steps) => format!("{}\n{}", self, steps),
            None => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::scanner::AttemptOutcome;

    #[test]
    fn test_recoverable_kinds_are_not_fatal() {
        let unknown = Error::UnknownRawIdentifier {
            kind: MissionKind::Main,
            raw: 999,
        };
        assert!(!unknown.is_fatal());
        assert!(unknown.remediation().is_none());
        assert!(!Error::TransportTimeout(Duration::from_secs(5)).is_fatal());
    }

    #[test]
    fn test_version_mismatch_diagnostic() {
        let err = Error::VersionMismatch {
            expected: 2,
            found: 1,
        };
        assert!(err.is_fatal());

        let msg = err.diagnostic();
        assert!(msg.contains("expected version 2"));
        assert!(msg.contains("found version 1"));
        assert!(msg.contains("Advanced > Compile"));
    }

    #[test]
    fn test_pointer_resolution_lists_attempts() {
        let err = Error::PointerResolution {
            marker_address: 0x1000,
            attempts: vec![
                HypothesisAttempt {
                    padding: 0,
                    pointer_address: 0x1011,
                    outcome: AttemptOutcome::NullPointer,
                },
                HypothesisAttempt {
                    padding: 4,
                    pointer_address: 0x1015,
                    outcome: AttemptOutcome::VersionFound {
                        block: 0x8000,
                        version: 7,
                    },
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("0x1000"));
        assert!(msg.contains("+0"));
        assert!(msg.contains("+4"));
        assert!(msg.contains("version 7"));
    }

    #[test]
    fn test_attach_diagnostic_points_at_permissions() {
        let err = Error::Attach {
            pid: 4242,
            reason: "/proc/4242/maps: Permission denied".to_string(),
        };
        assert!(err.is_fatal());

        let msg = err.diagnostic();
        assert!(msg.starts_with("could not open the memory of process 4242"));
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("ptrace"));
        assert!(!msg.contains("REPL"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_fatal());
    }
}

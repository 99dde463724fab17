//! Console commands accepted while the client is running
//!
//! Each stdin line is split on whitespace and parsed like a command line.
//! A leading `/` is accepted so chat-style input (`/repl connect`) works.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "console", no_binary_name = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Commands for the REPL client (server -> game)
    Repl {
        #[command(subcommand)]
        action: ReplAction,
    },

    /// Commands for the memory reader (game -> server)
    Memr {
        #[command(subcommand)]
        action: MemrAction,
    },

    /// Commands for both agents at once
    Debug {
        #[command(subcommand)]
        action: Option<DebugAction>,
    },

    /// Hand an item to the REPL client as if the server had sent it
    Item {
        /// Sequence number of the item
        index: u64,

        /// Multiworld item id
        item_id: u32,
    },

    /// Simulate session connect/disconnect
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Stop both agents and exit
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ReplAction {
    /// Connect to the REPL (goalc). Takes a while
    Connect,
    /// Show the REPL client status
    Status,
    /// Send a simple form and check the game answers
    Test,
    /// Echo every form and response
    Debug,
    /// Stop echoing forms and responses
    Debugoff,
    /// Deliver any pending items now
    Refresh,
    /// Send a raw GOAL form
    Send {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        form: Vec<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MemrAction {
    /// Connect to the game process (gk)
    Connect,
    /// Show the memory reader status
    Status,
    /// Re-read the structure version
    Test,
    /// Poll the game right now
    Refresh,
    /// List completed missions
    Missions,
    /// Show the memory structure layout
    Structure,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DebugAction {
    /// Status of the REPL client and memory reader
    Status,
    /// Echo REPL traffic
    On,
    /// Stop echoing REPL traffic
    Off,
    /// Test both connections
    Test,
    /// Game progress as the memory reader sees it
    Info,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Report a slot connection to the game
    Connect { slot: String, seed: String },
    /// Report that the server connection was lost
    Disconnect,
}

/// Parse one console line. Blank lines yield `None`.
///
/// Errors carry clap's rendered usage or help text.
pub fn parse_line(line: &str) -> Option<Result<ConsoleCommand, clap::Error>> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    if line.is_empty() {
        return None;
    }

    Some(ConsoleLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command))
}

//! CLI argument definitions for jak2-client
//!
//! Process arguments live in `core`; the line-oriented console that runs
//! inside `jak2-client run` is parsed with clap too, from `console`.

mod console;
mod core;

pub use console::{parse_line, ConsoleCommand, DebugAction, MemrAction, ReplAction, SessionAction};
pub use core::{Cli, Commands};

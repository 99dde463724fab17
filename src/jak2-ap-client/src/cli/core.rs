//! Core CLI definitions

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jak2-client")]
#[command(about = "Archipelago client for Jak II (ArchipelaGOAL)", long_about = None)]
pub struct Cli {
    /// Log debug output from the client and both agents (RUST_LOG wins if set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the memory reader and REPL client, then read console commands
    #[command(visible_alias = "r")]
    Run {
        /// Connect both agents immediately instead of waiting for
        /// `memr connect` / `repl connect`
        #[arg(long)]
        auto_connect: bool,

        /// REPL port (overrides the configured value)
        #[arg(long)]
        repl_port: Option<u16>,

        /// Agent tick interval in milliseconds (overrides the configured value)
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Print the offsets of the game's ap-info-jak2 memory structure
    #[command(visible_alias = "l")]
    Layout {
        /// Structure version to lay out (defaults to the supported one)
        #[arg(long)]
        version: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default REPL port
        #[arg(long)]
        repl_port: Option<u16>,

        /// Set the game executable name to look for
        #[arg(long)]
        game_process: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

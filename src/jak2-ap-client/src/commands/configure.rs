//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up jak2-client defaults.

use crate::config::Config;
use anyhow::Result;

/// Handle the configure command
///
/// # Arguments
/// * `repl_port` - Optional REPL port to store
/// * `game_process` - Optional game executable name to store
/// * `show` - If true, show current configuration
pub fn handle(repl_port: Option<u16>, game_process: Option<String>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        print!("{}", describe(&config));
        if let Ok(path) = Config::config_path() {
            println!("Config file: {}", path.display());
        }
        return Ok(());
    }

    if !apply(&mut config, repl_port, game_process) {
        show_usage();
        return Ok(());
    }

    config.save()?;
    println!("Configuration saved.");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Apply the requested changes. Returns false if there were none.
fn apply(config: &mut Config, repl_port: Option<u16>, game_process: Option<String>) -> bool {
    let mut changed = false;

    if let Some(port) = repl_port {
        config.repl.port = port;
        changed = true;
    }

    if let Some(name) = game_process {
        // both agents look for the same game executable
        config.memory.process_name = name.clone();
        config.repl.game_process = name;
        changed = true;
    }

    changed
}

fn describe(config: &Config) -> String {
    format!(
        "REPL address: {}\n\
         Game process: {}\n\
         Compiler process: {}\n\
         Memory marker: {}\n\
         Structure version: {}\n\
         Tick interval: {} ms\n",
        config.repl.address(),
        config.memory.process_name,
        config.repl.compiler_process,
        config.memory.marker,
        config.memory.expected_version,
        config.orchestrator.tick_ms,
    )
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: jak2-client configure --repl-port PORT");
    println!("   or: jak2-client configure --game-process NAME");
    println!("   or: jak2-client configure --show");
    println!();
    println!("Note: the REPL port is shown by goalc when it starts (8181 unless changed).");
}

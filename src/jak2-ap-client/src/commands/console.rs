//! Console command handlers
//!
//! Turns parsed console lines into orchestrator commands and formats the
//! status snapshots the agents send back.

use std::fmt::Write;

use anyhow::Result;
use jak2_ap::{
    BlockLayout, ClientOrchestrator, CompletedMission, MemoryCommand, NetworkItem, PollerStatus,
    ReplCommand, ReplStatus, SessionEvent, SlotIdentity,
};

use super::layout::render_table;
use crate::cli::{parse_line, ConsoleCommand, DebugAction, MemrAction, ReplAction, SessionAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one console line.
///
/// Bad input prints clap's message and keeps going; an error means an
/// agent has stopped.
pub async fn execute(client: &ClientOrchestrator, line: &str) -> Result<Flow> {
    let command = match parse_line(line) {
        None => return Ok(Flow::Continue),
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            print!("{}", e);
            return Ok(Flow::Continue);
        }
    };

    match command {
        ConsoleCommand::Repl { action } => repl(client, action).await?,
        ConsoleCommand::Memr { action } => memr(client, action).await?,
        ConsoleCommand::Debug { action } => {
            debug(client, action.unwrap_or(DebugAction::Status)).await?
        }
        ConsoleCommand::Item { index, item_id } => {
            let item = NetworkItem {
                item: item_id,
                location: 0,
                player: 0,
            };
            client
                .handle_session_event(SessionEvent::ReceivedItems {
                    index,
                    items: vec![item],
                })
                .await?;
        }
        ConsoleCommand::Session { action } => {
            let event = match action {
                SessionAction::Connect { slot, seed } => {
                    SessionEvent::Connected(SlotIdentity::new(&slot, &seed))
                }
                SessionAction::Disconnect => SessionEvent::Disconnected,
            };
            client.handle_session_event(event).await?;
        }
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

async fn repl(client: &ClientOrchestrator, action: ReplAction) -> Result<()> {
    let command = match action {
        ReplAction::Connect => {
            println!("This may take a bit... Wait for the success message before continuing!");
            ReplCommand::Connect
        }
        ReplAction::Status => {
            print!("{}", format_repl_status(&client.repl_status().await?));
            return Ok(());
        }
        ReplAction::Test => ReplCommand::Test,
        ReplAction::Debug => ReplCommand::SetDebug(true),
        ReplAction::Debugoff => ReplCommand::SetDebug(false),
        ReplAction::Refresh => ReplCommand::Refresh,
        ReplAction::Send { form } => ReplCommand::Send(form.join(" ")),
    };

    client.repl(command).await?;
    Ok(())
}

async fn memr(client: &ClientOrchestrator, action: MemrAction) -> Result<()> {
    match action {
        MemrAction::Connect => client.memory(MemoryCommand::Connect).await?,
        MemrAction::Status => print!("{}", format_poller_status(&client.memory_status().await?)),
        MemrAction::Test => client.memory(MemoryCommand::Test).await?,
        MemrAction::Refresh => client.memory(MemoryCommand::Refresh).await?,
        MemrAction::Missions => print!("{}", format_missions(&client.completed_missions().await?)),
        MemrAction::Structure => {
            let status = client.memory_status().await?;
            if status.block_address.is_none() {
                println!("Memory reader is not connected; showing offsets only.");
            }
            print!("{}", render_table(&BlockLayout::current(), status.block_address));
        }
    }
    Ok(())
}

async fn debug(client: &ClientOrchestrator, action: DebugAction) -> Result<()> {
    match action {
        DebugAction::Status => {
            print!("{}", format_repl_status(&client.repl_status().await?));
            print!("{}", format_poller_status(&client.memory_status().await?));
        }
        DebugAction::On => client.repl(ReplCommand::SetDebug(true)).await?,
        DebugAction::Off => client.repl(ReplCommand::SetDebug(false)).await?,
        DebugAction::Test => {
            client.memory(MemoryCommand::Test).await?;
            client.repl(ReplCommand::Test).await?;
        }
        DebugAction::Info => {
            let status = client.memory_status().await?;
            print!("{}", format_poller_status(&status));
            print!("{}", format_missions(&client.completed_missions().await?));
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn pid_or_missing(pid: Option<u32>) -> String {
    pid.map_or_else(|| "not found".to_string(), |pid| pid.to_string())
}

pub fn format_repl_status(status: &ReplStatus) -> String {
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(out, "REPL client: {}", status.state);
    let _ = writeln!(out, "  Address: {}", status.address);
    let _ = writeln!(out, "  Game process: {}", pid_or_missing(status.game_pid));
    let _ = writeln!(out, "  Compiler process: {}", pid_or_missing(status.compiler_pid));
    let _ = writeln!(
        out,
        "  Items processed: {}, pending: {}",
        status.processed, status.pending
    );
    if let Some(index) = status.blocked_at {
        let _ = writeln!(out, "  Waiting for item #{}", index);
    }
    let _ = writeln!(out, "  Debug mode: {}", if status.debug { "on" } else { "off" });
    if let Some(identity) = &status.identity {
        let _ = writeln!(out, "  Slot: {} (seed {})", identity.slot_name, identity.seed);
    }

    out
}

pub fn format_poller_status(status: &PollerStatus) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Memory reader: {}", status.state);
    let _ = writeln!(out, "  Game process: {}", pid_or_missing(status.pid));
    if let Some(address) = status.block_address {
        let _ = write!(out, "  Structure: {:#x}", address);
        if let Some(padding) = status.padding {
            let _ = write!(out, " (pointer after +{} padding)", padding);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "  Locations checked: {}, reported: {}",
        status.checked, status.reported
    );
    if let Some(location) = status.last_location {
        let name = location.mission().map_or("unknown", |m| m.name);
        let _ = writeln!(out, "  Last location: {} ({})", location, name);
    }
    let _ = writeln!(out, "  Game finished: {}", yes_no(status.game_finished));
    if let Some(game_status) = status.game_status {
        let _ = writeln!(out, "  In-game connection status: {}", game_status);
    }

    out
}

pub fn format_missions(missions: &[CompletedMission]) -> String {
    if missions.is_empty() {
        return "No missions completed yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Completed missions ({}):", missions.len());
    for mission in missions {
        let _ = writeln!(
            out,
            "  [{:>3}] {}: {}",
            mission.location.0, mission.kind, mission.name
        );
    }
    out
}

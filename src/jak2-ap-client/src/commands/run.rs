//! Run command handler
//!
//! Starts both agents and reads console commands from stdin until `quit`,
//! end of input or Ctrl-C. There is no multiworld server connection here:
//! checked locations and the goal are printed, and items or session
//! changes are entered through the console.

use std::sync::Arc;

use anyhow::{Context, Result};
use jak2_ap::{
    ClientOrchestrator, LogSink, MemoryPoller, ProcessProvider, ReplClient, TracingSink,
    UpstreamEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::console::{execute, Flow};
use crate::config::Config;
use crate::process::LiveProcessProvider;

const UPSTREAM_BUFFER: usize = 64;

/// Handle the run command
pub async fn handle(auto_connect: bool, repl_port: Option<u16>, tick_ms: Option<u64>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = repl_port {
        config.repl.port = port;
    }
    if let Some(ms) = tick_ms {
        config.orchestrator.tick_ms = ms;
    }

    let provider: Arc<dyn ProcessProvider> = Arc::new(LiveProcessProvider);
    let log: Arc<dyn LogSink> = Arc::new(TracingSink);

    let poller = MemoryPoller::new(config.memory, provider.clone(), log.clone());
    let repl = ReplClient::new(config.repl, provider, log);

    let (upstream_tx, upstream_rx) = mpsc::channel(UPSTREAM_BUFFER);
    let client = ClientOrchestrator::spawn(config.orchestrator, poller, repl, upstream_tx);
    let reporter = tokio::spawn(report_upstream(upstream_rx));

    info!("Jak II client started. Enter 'memr connect' and 'repl connect', or 'quit' to exit.");
    if auto_connect {
        client.connect_all().await?;
    }

    let result = read_console(&client).await;

    client.shutdown().await;
    if let Err(e) = reporter.await {
        debug!("upstream reporter ended abnormally: {}", e);
    }

    result
}

async fn read_console(client: &ClientOrchestrator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read console input")? else {
                    return Ok(());
                };
                if execute(client, &line).await? == Flow::Quit {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Stand-in for the multiworld session: prints what would be sent.
async fn report_upstream(mut events: mpsc::Receiver<UpstreamEvent>) {
    while let Some(event) = events.recv().await {
        println!("{}", describe_event(&event));
    }
}

fn describe_event(event: &UpstreamEvent) -> String {
    match event {
        UpstreamEvent::LocationsChecked(locations) => {
            let names: Vec<String> = locations
                .iter()
                .map(|location| match location.mission() {
                    Some(mission) => format!("{} ({})", location, mission.name),
                    None => location.to_string(),
                })
                .collect();
            format!("Checked locations: {}", names.join(", "))
        }
        UpstreamEvent::GoalCompleted => "Goal complete! The game has been finished.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jak2_ap::LocationId;

    #[test]
    fn test_describe_checked_locations() {
        let event = UpstreamEvent::LocationsChecked(vec![LocationId(1), LocationId(105), LocationId(999)]);
        assert_eq!(
            describe_event(&event),
            "Checked locations: 1 (Escape From Prison), 105 (Orb Search 5 (Computer #9)), 999"
        );
    }

    #[test]
    fn test_describe_goal() {
        assert!(describe_event(&UpstreamEvent::GoalCompleted).starts_with("Goal complete!"));
    }

    #[tokio::test]
    async fn test_reporter_stops_when_agents_drop_the_channel() {
        let (tx, rx) = mpsc::channel(4);
        let reporter = tokio::spawn(report_upstream(rx));

        tx.send(UpstreamEvent::GoalCompleted).await.unwrap();
        drop(tx);

        reporter.await.unwrap();
    }
}

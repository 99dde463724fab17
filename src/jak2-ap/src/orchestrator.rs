//! Client orchestrator
//!
//! Runs the Memory Reader and REPL Client agents as independent tokio
//! tasks, each on its own interval. Agents are owned by their task; the
//! rest of the client talks to them over command channels, so no agent
//! state is ever shared or locked.
//!
//! Memory reader -> session: newly checked locations and the goal.
//! Session -> REPL client: indexed items and connection status.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::poller::{CompletedMission, MemoryPoller, PollerStatus};
use crate::repl::{ReplClient, ReplStatus};
use crate::session::{GameConnectionStatus, NetworkItem, SessionEvent, SlotIdentity, UpstreamEvent};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub tick_ms: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

impl OrchestratorSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug)]
pub enum MemoryCommand {
    Connect,
    Test,
    Refresh,
    Status(oneshot::Sender<PollerStatus>),
    Missions(oneshot::Sender<Vec<CompletedMission>>),
}

#[derive(Debug)]
pub enum ReplCommand {
    Connect,
    Disconnect,
    Status(oneshot::Sender<ReplStatus>),
    Test,
    SetDebug(bool),
    Refresh,
    Send(String),
    Enqueue { index: u64, item: NetworkItem },
    SetGameStatus(GameConnectionStatus),
    SetupOptions(SlotIdentity),
}

pub struct ClientOrchestrator {
    memory: mpsc::Sender<MemoryCommand>,
    repl: mpsc::Sender<ReplCommand>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ClientOrchestrator {
    /// Start both agent tasks. Upstream events are sent on `upstream`.
    pub fn spawn(
        settings: OrchestratorSettings,
        poller: MemoryPoller,
        repl: ReplClient,
        upstream: mpsc::Sender<UpstreamEvent>,
    ) -> Self {
        let (memory_tx, memory_rx) = mpsc::channel(COMMAND_BUFFER);
        let (repl_tx, repl_rx) = mpsc::channel(COMMAND_BUFFER);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let tasks = vec![
            tokio::spawn(run_memory_agent(
                poller,
                memory_rx,
                upstream,
                shutdown_rx.clone(),
                settings.tick(),
            )),
            tokio::spawn(run_repl_agent(repl, repl_rx, shutdown_rx, settings.tick())),
        ];

        Self {
            memory: memory_tx,
            repl: repl_tx,
            shutdown,
            tasks,
        }
    }

    pub async fn memory(&self, command: MemoryCommand) -> Result<()> {
        self.memory
            .send(command)
            .await
            .map_err(|_| Error::AgentStopped("memory reader"))
    }

    pub async fn repl(&self, command: ReplCommand) -> Result<()> {
        self.repl
            .send(command)
            .await
            .map_err(|_| Error::AgentStopped("REPL client"))
    }

    pub async fn memory_status(&self) -> Result<PollerStatus> {
        let (tx, rx) = oneshot::channel();
        self.memory(MemoryCommand::Status(tx)).await?;
        rx.await.map_err(|_| Error::AgentStopped("memory reader"))
    }

    pub async fn completed_missions(&self) -> Result<Vec<CompletedMission>> {
        let (tx, rx) = oneshot::channel();
        self.memory(MemoryCommand::Missions(tx)).await?;
        rx.await.map_err(|_| Error::AgentStopped("memory reader"))
    }

    pub async fn repl_status(&self) -> Result<ReplStatus> {
        let (tx, rx) = oneshot::channel();
        self.repl(ReplCommand::Status(tx)).await?;
        rx.await.map_err(|_| Error::AgentStopped("REPL client"))
    }

    /// Ask both agents to (re)connect.
    pub async fn connect_all(&self) -> Result<()> {
        self.memory(MemoryCommand::Connect).await?;
        self.repl(ReplCommand::Connect).await
    }

    /// Route one event from the multiworld session.
    pub async fn handle_session_event(&self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::ReceivedItems { index, items } => {
                let count = items.len();
                debug!(index, count, "received items");

                let indexed = (0u64..)
                    .zip(items)
                    .map(|(offset, item)| index.checked_add(offset).map(|i| (i, item)))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(Error::ItemIndexOverflow { index, count })?;

                for (index, item) in indexed {
                    self.repl(ReplCommand::Enqueue { index, item }).await?;
                }
                Ok(())
            }
            SessionEvent::Connected(identity) => {
                self.repl(ReplCommand::SetupOptions(identity)).await?;
                self.repl(ReplCommand::SetGameStatus(GameConnectionStatus::Ready))
                    .await
            }
            SessionEvent::Disconnected => {
                self.repl(ReplCommand::SetGameStatus(GameConnectionStatus::Disconnected))
                    .await
            }
        }
    }

    /// Stop both agents and wait for them to finish.
    pub async fn shutdown(self) {
        // receivers may already be gone if an agent exited on its own
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                debug!("agent task ended abnormally: {}", e);
            }
        }
    }
}

async fn run_memory_agent(
    mut poller: MemoryPoller,
    mut commands: mpsc::Receiver<MemoryCommand>,
    upstream: mpsc::Sender<UpstreamEvent>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut goal_reported = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poller = match tick_memory(poller).await {
                    Some(poller) => poller,
                    None => break,
                };

                let checked = poller.take_pending();
                if !checked.is_empty() {
                    debug!(count = checked.len(), "relaying checked locations");
                    if upstream.send(UpstreamEvent::LocationsChecked(checked)).await.is_err() {
                        break;
                    }
                }

                if poller.game_finished() && !goal_reported {
                    goal_reported = true;
                    info!("relaying goal completion");
                    if upstream.send(UpstreamEvent::GoalCompleted).await.is_err() {
                        break;
                    }
                }
            }
            Some(command) = commands.recv() => match command {
                MemoryCommand::Connect => poller.request_connect(),
                MemoryCommand::Test => {
                    poller.test_connection();
                }
                MemoryCommand::Refresh => {
                    poller.refresh();
                }
                MemoryCommand::Status(reply) => {
                    let _ = reply.send(poller.status());
                }
                MemoryCommand::Missions(reply) => {
                    let _ = reply.send(poller.mission_report());
                }
            },
            _ = shutdown.changed() => break,
        }
    }

    debug!("memory reader agent stopped");
}

/// Scanning modules for the marker reads a lot of memory, so connection
/// steps run on the blocking pool. Steady polls are a few small reads and
/// stay on the agent task.
async fn tick_memory(mut poller: MemoryPoller) -> Option<MemoryPoller> {
    if !poller.state().is_connecting() {
        poller.tick();
        return Some(poller);
    }

    match task::spawn_blocking(move || {
        poller.tick();
        poller
    })
    .await
    {
        Ok(poller) => Some(poller),
        Err(e) => {
            error!("memory reader connection step panicked: {}", e);
            None
        }
    }
}

async fn run_repl_agent(
    mut client: ReplClient,
    mut commands: mpsc::Receiver<ReplCommand>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => client.tick().await,
            Some(command) = commands.recv() => handle_repl_command(&mut client, command).await,
            _ = shutdown.changed() => break,
        }
    }

    client.disconnect().await;
    debug!("REPL client agent stopped");
}

async fn handle_repl_command(client: &mut ReplClient, command: ReplCommand) {
    // failures are reported to the user through the client's log sink
    match command {
        ReplCommand::Connect => client.request_connect(),
        ReplCommand::Disconnect => client.disconnect().await,
        ReplCommand::Status(reply) => {
            let _ = reply.send(client.status());
        }
        ReplCommand::Test => {
            let _ = client.test_connection().await;
        }
        ReplCommand::SetDebug(enabled) => client.set_debug(enabled),
        ReplCommand::Refresh => {
            client.refresh().await;
        }
        ReplCommand::Send(form) => {
            let _ = client.send_raw(&form).await;
        }
        ReplCommand::Enqueue { index, item } => {
            client.enqueue(index, item);
        }
        ReplCommand::SetGameStatus(status) => {
            let _ = client.set_game_status(status).await;
        }
        ReplCommand::SetupOptions(identity) => client.setup_options(identity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::testing::RecordingSink;
    use crate::log::LogSink;
    use crate::mapping::LocationId;
    use crate::memory::source::{MockMemorySource, MockProcessProvider};
    use crate::poller::testing::GameImage;
    use crate::poller::ConnectionState;
    use crate::repl::testing::{FakeRepl, GREETING};
    use crate::repl::ReplSettings;
    use std::sync::Arc;
    use tokio::time::timeout;

    fn repl_client(port: u16, running: &[&str], log: Arc<dyn LogSink>) -> ReplClient {
        let settings = ReplSettings {
            port,
            response_timeout_ms: 500,
            greeting_delay_ms: 10,
            step_delay_ms: 1,
            compile_delay_ms: 1,
            ..ReplSettings::default()
        };
        let memory = Arc::new(MockMemorySource::new(vec![0; 16], 0x1000));
        let provider = Arc::new(MockProcessProvider::new(memory, running));
        ReplClient::new(settings, provider, log)
    }

    fn orchestrator(game: &GameImage) -> (ClientOrchestrator, mpsc::Receiver<UpstreamEvent>) {
        let log: Arc<dyn LogSink> = Arc::new(RecordingSink::default());
        let (tx, rx) = mpsc::channel(16);
        let orchestrator = ClientOrchestrator::spawn(
            OrchestratorSettings::default(),
            game.poller(Arc::clone(&log)),
            repl_client(1, &[], log),
            tx,
        );
        (orchestrator, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_checked_locations_and_goal_are_relayed_once() {
        let game = GameImage::new(2);
        game.set_main(&[6, 70]);
        game.set_side(&[5]);
        let (orchestrator, mut upstream) = orchestrator(&game);

        orchestrator.memory(MemoryCommand::Connect).await.unwrap();

        let checked = upstream.recv().await.unwrap();
        assert_eq!(
            checked,
            UpstreamEvent::LocationsChecked(vec![LocationId(1), LocationId(65), LocationId(105)])
        );
        assert_eq!(upstream.recv().await.unwrap(), UpstreamEvent::GoalCompleted);

        // later polls see the same data and stay quiet
        let quiet = timeout(Duration::from_secs(2), upstream.recv()).await;
        assert!(quiet.is_err());

        game.set_main(&[6, 70, 7]);
        assert_eq!(
            upstream.recv().await.unwrap(),
            UpstreamEvent::LocationsChecked(vec![LocationId(2)])
        );

        let status = orchestrator.memory_status().await.unwrap();
        assert_eq!(status.state, ConnectionState::Ready);
        assert!(status.game_finished);
        assert_eq!(status.reported, 4);

        let missions = orchestrator.completed_missions().await.unwrap();
        assert_eq!(missions.len(), 4);

        orchestrator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_queue_while_repl_disconnected() {
        let game = GameImage::new(2);
        let (orchestrator, _upstream) = orchestrator(&game);

        let items = vec![
            NetworkItem { item: 8, location: 3, player: 2 },
            NetworkItem { item: 14, location: 9, player: 2 },
        ];
        orchestrator
            .handle_session_event(SessionEvent::ReceivedItems { index: 0, items })
            .await
            .unwrap();
        orchestrator
            .handle_session_event(SessionEvent::ReceivedItems {
                index: 3,
                items: vec![NetworkItem { item: 1, location: 4, player: 2 }],
            })
            .await
            .unwrap();

        let status = orchestrator.repl_status().await.unwrap();
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert_eq!(status.pending, 3);
        assert_eq!(status.processed, 0);

        orchestrator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_batch_past_the_last_index_is_rejected() {
        let game = GameImage::new(2);
        let (orchestrator, _upstream) = orchestrator(&game);

        let result = orchestrator
            .handle_session_event(SessionEvent::ReceivedItems {
                index: u64::MAX,
                items: vec![
                    NetworkItem { item: 8, location: 3, player: 2 },
                    NetworkItem { item: 14, location: 9, player: 2 },
                ],
            })
            .await;
        assert!(matches!(
            result,
            Err(Error::ItemIndexOverflow { index: u64::MAX, count: 2 })
        ));

        // a single item at the last index still fits
        orchestrator
            .handle_session_event(SessionEvent::ReceivedItems {
                index: u64::MAX,
                items: vec![NetworkItem { item: 8, location: 3, player: 2 }],
            })
            .await
            .unwrap();

        let status = orchestrator.repl_status().await.unwrap();
        assert_eq!(status.pending, 1);

        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_memory_test_and_refresh_commands() {
        let game = GameImage::new(2);
        game.set_main(&[6]);
        let (orchestrator, mut upstream) = orchestrator(&game);

        orchestrator.memory(MemoryCommand::Connect).await.unwrap();
        assert_eq!(
            upstream.recv().await.unwrap(),
            UpstreamEvent::LocationsChecked(vec![LocationId(1)])
        );

        game.set_main(&[6, 7]);
        orchestrator.memory(MemoryCommand::Refresh).await.unwrap();
        orchestrator.memory(MemoryCommand::Test).await.unwrap();
        assert_eq!(
            upstream.recv().await.unwrap(),
            UpstreamEvent::LocationsChecked(vec![LocationId(2)])
        );

        let status = orchestrator.memory_status().await.unwrap();
        assert_eq!(status.state, ConnectionState::Ready);

        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_items_and_status_reach_the_game() {
        let (repl, port) = FakeRepl::listen(GREETING).await;
        let game = GameImage::new(2);
        let log: Arc<dyn LogSink> = Arc::new(RecordingSink::default());
        let (tx, _upstream) = mpsc::channel(16);
        let orchestrator = ClientOrchestrator::spawn(
            OrchestratorSettings { tick_ms: 5 },
            game.poller(Arc::clone(&log)),
            repl_client(port, &["gk.exe", "goalc.exe"], log),
            tx,
        );

        orchestrator
            .handle_session_event(SessionEvent::ReceivedItems {
                index: 0,
                items: vec![
                    NetworkItem { item: 8, location: 3, player: 2 },
                    NetworkItem { item: 14, location: 9, player: 2 },
                ],
            })
            .await
            .unwrap();
        orchestrator.repl(ReplCommand::Connect).await.unwrap();

        let mut delivered = Vec::new();
        for _ in 0..200 {
            delivered = repl.delivered_symbols().await;
            if delivered.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(delivered, vec!["board", "pass-red"]);

        orchestrator
            .handle_session_event(SessionEvent::Connected(SlotIdentity::new("Jak", "4242")))
            .await
            .unwrap();
        let status = orchestrator.repl_status().await.unwrap();
        assert_eq!(status.identity.unwrap().slot_name, "Jak");

        let forms = repl.forms().await;
        assert_eq!(
            forms.last().map(String::as_str),
            Some("(ap-set-connection-status! (ap-connection-status ready))")
        );

        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_stopped_agent_is_reported() {
        let game = GameImage::new(2);
        let (orchestrator, _upstream) = orchestrator(&game);
        let memory = orchestrator.memory.clone();
        orchestrator.shutdown().await;

        let (tx, _rx) = oneshot::channel();
        assert!(memory.send(MemoryCommand::Status(tx)).await.is_err());
    }
}

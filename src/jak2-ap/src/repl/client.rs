//! REPL Client agent
//!
//! Owns the compiler connection and the item inbox. Connecting checks that
//! both the game and the compiler are running, opens the socket and runs
//! the handshake; afterwards every tick drains the inbox into the game.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::dispatcher::{DrainSummary, ItemDispatcher};
use super::handshake::{HandshakeSequencer, HandshakeTiming};
use super::protocol::{connection_status_form, item_received_form};
use super::transport::{ReplTransport, SendOutcome};
use crate::catalog;
use crate::error::{Error, Result};
use crate::log::LogSink;
use crate::memory::ProcessProvider;
use crate::poller::ConnectionState;
use crate::session::{GameConnectionStatus, NetworkItem, SlotIdentity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplSettings {
    pub host: String,
    pub port: u16,
    pub game_process: String,
    pub compiler_process: String,
    pub response_timeout_ms: u64,
    pub test_timeout_ms: u64,
    pub greeting_delay_ms: u64,
    pub greeting_timeout_ms: u64,
    pub step_delay_ms: u64,
    pub compile_delay_ms: u64,
}

impl Default for ReplSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8181,
            game_process: "gk.exe".to_string(),
            compiler_process: "goalc.exe".to_string(),
            response_timeout_ms: 5_000,
            test_timeout_ms: 10_000,
            greeting_delay_ms: 1_000,
            greeting_timeout_ms: 5_000,
            step_delay_ms: 500,
            compile_delay_ms: 30_000,
        }
    }
}

impl ReplSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn handshake_timing(&self) -> HandshakeTiming {
        HandshakeTiming {
            greeting_delay: Duration::from_millis(self.greeting_delay_ms),
            greeting_timeout: Duration::from_millis(self.greeting_timeout_ms),
            step_delay: Duration::from_millis(self.step_delay_ms),
            compile_delay: Duration::from_millis(self.compile_delay_ms),
        }
    }
}

/// Snapshot for `repl status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplStatus {
    pub state: ConnectionState,
    pub address: String,
    pub game_pid: Option<u32>,
    pub compiler_pid: Option<u32>,
    pub processed: u64,
    pub pending: usize,
    pub blocked_at: Option<u64>,
    pub debug: bool,
    pub identity: Option<SlotIdentity>,
}

/// Result of `repl test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionTest {
    Passed,
    /// The REPL answered but the game check gave nothing back.
    Inconclusive,
}

pub struct ReplClient {
    settings: ReplSettings,
    provider: Arc<dyn ProcessProvider>,
    log: Arc<dyn LogSink>,

    state: ConnectionState,
    connect_requested: bool,
    transport: Option<ReplTransport>,
    dispatcher: ItemDispatcher,

    game_pid: Option<u32>,
    compiler_pid: Option<u32>,
    debug: bool,
    identity: Option<SlotIdentity>,
}

impl ReplClient {
    pub fn new(
        settings: ReplSettings,
        provider: Arc<dyn ProcessProvider>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            settings,
            provider,
            log,
            state: ConnectionState::Disconnected,
            connect_requested: false,
            transport: None,
            dispatcher: ItemDispatcher::new(),
            game_pid: None,
            compiler_pid: None,
            debug: false,
            identity: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Connect on the next tick.
    pub fn request_connect(&mut self) {
        self.connect_requested = true;
    }

    pub async fn tick(&mut self) {
        if std::mem::take(&mut self.connect_requested) {
            if let Err(e) = self.connect().await {
                self.fail(&e).await;
            }
        }

        if self.is_ready() {
            self.deliver_pending().await;
        }
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.is_ready() {
            self.log.info("Already connected to the REPL.");
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        self.transport = None;

        self.game_pid = Some(self.find(&self.settings.game_process)?);
        self.compiler_pid = Some(self.find(&self.settings.compiler_process)?);

        let address = self.settings.address();
        debug!(%address, "opening REPL connection");
        let stream = TcpStream::connect(&address).await?;
        let transport = ReplTransport::new(stream, self.settings.response_timeout());

        HandshakeSequencer::new(self.settings.handshake_timing(), self.log.as_ref())
            .run(&transport)
            .await?;

        self.transport = Some(transport);
        self.state = ConnectionState::Ready;
        self.log
            .success("Connected to the Jak II REPL. All systems ready.");
        Ok(())
    }

    fn find(&self, process: &str) -> Result<u32> {
        let pid = self
            .provider
            .find_process(process)
            .ok_or_else(|| Error::ProcessNotFound(process.to_string()))?;
        debug!(pid, "found {}", process);
        Ok(pid)
    }

    pub async fn disconnect(&mut self) {
        self.close_transport().await;
        self.state = ConnectionState::Disconnected;
    }

    async fn fail(&mut self, error: &Error) {
        self.log.error(&error.diagnostic());
        self.close_transport().await;
        self.state = ConnectionState::Failed;
    }

    // the socket may already be gone; that is not worth a user-facing error
    async fn close_transport(&mut self) {
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.shutdown().await {
                debug!("error closing REPL connection: {}", e);
            }
        }
    }

    /// Queue an item from the session under its sequence number.
    pub fn enqueue(&mut self, index: u64, item: NetworkItem) -> bool {
        self.dispatcher.enqueue(index, item)
    }

    async fn deliver_pending(&mut self) -> Option<DrainSummary> {
        let transport = self.transport.as_ref()?;
        let log = self.log.as_ref();
        let debug = self.debug;

        let result = self
            .dispatcher
            .drain(|index, item| deliver_item(transport, log, debug, index, item))
            .await;

        match result {
            Ok(summary) => {
                if summary.delivered > 0 {
                    info!(delivered = summary.delivered, failed = summary.failed, "sent items to game");
                }
                Some(summary)
            }
            Err(e) => {
                self.fail(&e).await;
                None
            }
        }
    }

    /// Send a form and report any transport failure as fatal.
    async fn exchange(&mut self, form: &str, wait: Duration) -> Result<SendOutcome> {
        let transport = self.transport.as_ref().ok_or(Error::NotConnected)?;

        if self.debug {
            self.log.info(&format!("Sending: {}", form));
        }

        match transport.send_with_timeout(form, wait).await {
            Ok(outcome) => {
                if self.debug {
                    let response = outcome.response().map(str::trim).unwrap_or("(no response)");
                    self.log.info(&format!("Response: {}", response));
                }
                Ok(outcome)
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Debug passthrough for arbitrary forms.
    pub async fn send_raw(&mut self, form: &str) -> Result<SendOutcome> {
        if !self.is_ready() {
            self.log
                .error("Not connected to the REPL; cannot send command.");
            return Err(Error::NotConnected);
        }

        let wait = Duration::from_millis(self.settings.test_timeout_ms);
        let outcome = self.exchange(form, wait).await?;
        self.log.success("Debug command sent.");
        Ok(outcome)
    }

    /// Check the REPL answers, then that the game is attached to it.
    pub async fn test_connection(&mut self) -> Result<ConnectionTest> {
        if !self.is_ready() {
            self.log
                .error("Not connected to the REPL; cannot test connection.");
            return Err(Error::NotConnected);
        }

        let wait = Duration::from_millis(self.settings.test_timeout_ms);
        self.exchange("(* 2 21)", wait).await?;
        self.log
            .success("Connection test PASSED: the REPL is responding.");

        let game_check = self
            .exchange(
                "(if *target* 'connected 'not-connected)",
                self.settings.response_timeout(),
            )
            .await?;

        if game_check.response().is_some() {
            self.log.success("Game connection test PASSED.");
            Ok(ConnectionTest::Passed)
        } else {
            self.log.warn("Game connection test inconclusive.");
            Ok(ConnectionTest::Inconclusive)
        }
    }

    /// Report inbox counters and deliver whatever is ready.
    pub async fn refresh(&mut self) -> Option<DrainSummary> {
        if !self.is_ready() {
            self.log
                .error("Not connected to the REPL; cannot refresh items.");
            return None;
        }

        self.log.info(&format!(
            "Items processed: {}, pending: {}",
            self.dispatcher.inbox_index(),
            self.dispatcher.pending()
        ));
        if let Some(gap) = self.dispatcher.blocked_at() {
            self.log
                .info(&format!("Waiting for item #{} before delivering more.", gap));
        }

        let summary = self.deliver_pending().await;
        if summary.is_some() {
            self.log.success("Item refresh complete.");
        }
        summary
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
        let message = if enabled {
            "REPL debug mode enabled."
        } else {
            "REPL debug mode disabled."
        };
        self.log.info(message);
    }

    /// Update the in-game connection indicator.
    pub async fn set_game_status(&mut self, status: GameConnectionStatus) -> Result<()> {
        if !self.is_ready() {
            debug!(%status, "not connected; game status not sent");
            return Ok(());
        }

        let form = connection_status_form(status);
        self.exchange(&form, self.settings.response_timeout())
            .await
            .map(|_| ())
    }

    pub fn setup_options(&mut self, identity: SlotIdentity) {
        self.log.info(&format!(
            "Initialized Jak II Archipelago for slot '{}' with seed '{}'.",
            identity.slot_name, identity.seed
        ));
        self.identity = Some(identity);
    }

    pub fn status(&self) -> ReplStatus {
        ReplStatus {
            state: self.state,
            address: self.settings.address(),
            game_pid: self.game_pid,
            compiler_pid: self.compiler_pid,
            processed: self.dispatcher.inbox_index(),
            pending: self.dispatcher.pending(),
            blocked_at: self.dispatcher.blocked_at(),
            debug: self.debug,
            identity: self.identity.clone(),
        }
    }
}

/// Deliver one item; `Ok(false)` when it cannot be expressed as a form.
async fn deliver_item(
    transport: &ReplTransport,
    log: &dyn LogSink,
    debug: bool,
    index: u64,
    item: NetworkItem,
) -> Result<bool> {
    let Some(record) = catalog::item_by_id(item.item) else {
        log.warn(&format!("Unknown item ID {} at index {}.", item.item, index));
        return Ok(false);
    };

    let form = item_received_form(record.symbol);
    if debug {
        log.info(&format!("Sending: {}", form));
    }
    transport.send(&form).await?;

    log.success(&format!("Gave item: {}", record.name));
    Ok(true)
}

//! Connection bootstrap
//!
//! A freshly opened REPL must greet us, then be walked through a fixed
//! script before items can be delivered: attach to the game, compile and
//! load the mod, and flip the in-game connection status from `wait` to
//! `ready`. Steps run strictly in order.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::protocol::connection_status_form;
use super::transport::ReplTransport;
use crate::error::{Error, Result};
use crate::log::LogSink;
use crate::session::GameConnectionStatus;

/// Substrings every genuine OpenGOAL REPL greeting contains.
pub const GREETING_MARKERS: [&str; 2] = ["Connected to OpenGOAL", "nREPL!"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepWait {
    /// The regular pause between steps.
    Settle,
    /// Long enough for the mod to compile and load.
    Compile,
}

#[derive(Debug, Clone, Copy)]
pub struct BootstrapStep {
    pub description: &'static str,
    pub form: &'static str,
    pub wait: StepWait,
}

pub const BOOTSTRAP_SCRIPT: [BootstrapStep; 8] = [
    BootstrapStep {
        description: "Connecting REPL to game websocket",
        form: "(lt)",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Enabling debug segment",
        form: "(set! *debug-segment* #t)",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Compiling Jak II with the ArchipelaGOAL mod (this may take 30-60 seconds)",
        form: "(mi)",
        wait: StepWait::Compile,
    },
    BootstrapStep {
        description: "Setting connection status to 'wait'",
        form: "(ap-set-connection-status! (ap-connection-status wait))",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Playing success sound",
        form: "(dotimes (i 1) (sound-play-by-name (static-sound-name \"menu-close\") (new-sound-id) 1024 0 0 (sound-group sfx) #t))",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Disabling debug segment",
        form: "(set! *debug-segment* #f)",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Disabling cheat mode",
        form: "(set! *cheat-mode* #f)",
        wait: StepWait::Settle,
    },
    BootstrapStep {
        description: "Setting connection status to 'ready'",
        form: "(ap-set-connection-status! (ap-connection-status ready))",
        wait: StepWait::Settle,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeTiming {
    /// Pause before reading the greeting so it arrives in one piece.
    pub greeting_delay: Duration,
    pub greeting_timeout: Duration,
    pub step_delay: Duration,
    pub compile_delay: Duration,
}

impl Default for HandshakeTiming {
    fn default() -> Self {
        Self {
            greeting_delay: Duration::from_secs(1),
            greeting_timeout: Duration::from_secs(5),
            step_delay: Duration::from_millis(500),
            compile_delay: Duration::from_secs(30),
        }
    }
}

pub fn is_valid_greeting(greeting: &str) -> bool {
    GREETING_MARKERS.iter().all(|m| greeting.contains(m))
}

pub struct HandshakeSequencer<'a> {
    timing: HandshakeTiming,
    log: &'a dyn LogSink,
}

impl<'a> HandshakeSequencer<'a> {
    pub fn new(timing: HandshakeTiming, log: &'a dyn LogSink) -> Self {
        Self { timing, log }
    }

    /// Verify the greeting and run the bootstrap script.
    ///
    /// On failure, makes a best-effort attempt to set the in-game status to
    /// `failure` so the HUD does not sit at `wait`.
    pub async fn run<S>(&self, transport: &ReplTransport<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let result = match self.verify_greeting(transport).await {
            Ok(_) => self.run_bootstrap(transport).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!("REPL handshake failed: {}", e);
            let form = connection_status_form(GameConnectionStatus::Failure);
            if let Err(send_error) = transport.send_only(&form).await {
                debug!("could not report failure status: {}", send_error);
            }
        }

        result
    }

    pub async fn verify_greeting<S>(&self, transport: &ReplTransport<S>) -> Result<String>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        sleep(self.timing.greeting_delay).await;

        let greeting = match transport.read_unprompted(self.timing.greeting_timeout).await {
            Ok(greeting) => greeting,
            Err(Error::TransportTimeout(_)) => return Err(Error::GreetingMismatch(String::new())),
            Err(e) => return Err(e),
        };

        if !is_valid_greeting(&greeting) {
            return Err(Error::GreetingMismatch(greeting.trim().to_string()));
        }

        debug!(greeting = greeting.trim(), "received OpenGOAL greeting");
        Ok(greeting)
    }

    pub async fn run_bootstrap<S>(&self, transport: &ReplTransport<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let total = BOOTSTRAP_SCRIPT.len();

        for (i, step) in BOOTSTRAP_SCRIPT.iter().enumerate() {
            let label = format!("[{}/{}]", i + 1, total);
            self.log.info(&format!("{} {}...", label, step.description));

            transport.send(step.form).await?;

            let pause = match step.wait {
                StepWait::Settle => self.timing.step_delay,
                StepWait::Compile => self.timing.compile_delay,
            };
            sleep(pause).await;

            self.log.success(&format!("{} Done: {}", label, step.description));
        }

        Ok(())
    }
}

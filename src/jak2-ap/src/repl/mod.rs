//! OpenGOAL compiler REPL
//!
//! - `protocol`: request framing and the forms this client sends
//! - `transport`: single-flight request channel
//! - `handshake`: greeting check and bootstrap script
//! - `dispatcher`: ordered item inbox
//! - `client`: the REPL Client agent tying them together

pub mod client;
pub mod dispatcher;
pub mod handshake;
pub mod protocol;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use client::{ConnectionTest, ReplClient, ReplSettings, ReplStatus};
pub use dispatcher::{DrainSummary, ItemDispatcher};
pub use handshake::{HandshakeSequencer, HandshakeTiming, BOOTSTRAP_SCRIPT};
pub use transport::{ReplTransport, SendOutcome};

//! # jak2-ap
//!
//! Bridge between an Archipelago multiworld session and a running
//! ArchipelaGOAL Jak II game.
//!
//! Two agents do the work:
//! - The memory reader ([`MemoryPoller`]) finds the mod's `ap-info-jak2`
//!   block in the game process and reports completed missions as location
//!   checks.
//! - The REPL client ([`ReplClient`]) talks to the OpenGOAL compiler over
//!   its binary REPL protocol and delivers received items in order.
//!
//! [`ClientOrchestrator`] runs both on independent intervals and routes
//! events between them and the multiworld session.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jak2_ap::{
//!     ClientOrchestrator, MemoryPoller, OrchestratorSettings, PollerSettings,
//!     ProcessProvider, ReplClient, ReplSettings, TracingSink,
//! };
//!
//! # async fn run(provider: Arc<dyn ProcessProvider>) -> jak2_ap::Result<()> {
//! let log = Arc::new(TracingSink);
//! let poller = MemoryPoller::new(PollerSettings::default(), provider.clone(), log.clone());
//! let repl = ReplClient::new(ReplSettings::default(), provider, log);
//!
//! let (upstream, mut events) = tokio::sync::mpsc::channel(64);
//! let client = ClientOrchestrator::spawn(OrchestratorSettings::default(), poller, repl, upstream);
//! client.connect_all().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod log;
pub mod mapping;
pub mod memory;
pub mod offsets;
pub mod orchestrator;
pub mod poller;
pub mod repl;
pub mod session;

// Re-export commonly used items
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use log::{LogSink, TracingSink};
#[doc(inline)]
pub use mapping::{translate, LocationId};
#[doc(inline)]
pub use memory::{MemoryRegion, MemorySource, Module, ProcessProvider, StructureScanner};
#[doc(inline)]
pub use offsets::{BlockLayout, LayoutField, OffsetTable, EXPECTED_MEMORY_VERSION};
#[doc(inline)]
pub use orchestrator::{ClientOrchestrator, MemoryCommand, OrchestratorSettings, ReplCommand};
#[doc(inline)]
pub use poller::{CompletedMission, ConnectionState, MemoryPoller, PollerSettings, PollerStatus};
#[doc(inline)]
pub use repl::{ConnectionTest, ReplClient, ReplSettings, ReplStatus};
#[doc(inline)]
pub use session::{GameConnectionStatus, NetworkItem, SessionEvent, SlotIdentity, UpstreamEvent};

//! Memory Source Abstraction
//!
//! Core abstractions for reading memory from the game:
//! - `MemorySource` for any readable address space
//! - `ProcessProvider` for finding and attaching to processes
//! - Mock sources for testing

#[cfg(test)]
mod mock;
mod region;
mod traits;

#[cfg(test)]
pub use mock::{MockMemorySource, MockProcessProvider};
pub use region::{MemoryRegion, Module};
pub use traits::{MemorySource, ProcessProvider};

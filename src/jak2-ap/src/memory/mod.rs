//! Game memory access
//!
//! - `source`: process/memory abstractions and the test mock
//! - `pattern`: byte signature search
//! - `scanner`: marker discovery and pointer resolution

pub mod pattern;
pub mod scanner;
pub mod source;

pub use scanner::{MarkerMatch, ResolvedBlock, StructureScanner};
pub use source::{MemoryRegion, MemorySource, Module, ProcessProvider};

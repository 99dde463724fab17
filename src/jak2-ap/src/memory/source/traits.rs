//! Memory Source Traits
//!
//! Core abstractions for reading the game's memory and finding its process.

use super::{MemoryRegion, Module};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LE};

/// Read access to a process address space (live process or test buffer).
pub trait MemorySource: Send + Sync {
    /// Read bytes from a virtual address
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>>;

    /// Get the list of memory regions
    fn regions(&self) -> &[MemoryRegion];

    /// Id of the process behind this source
    fn pid(&self) -> u32;

    /// Read a u8 from memory
    fn read_u8(&self, address: usize) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    /// Read a u32 from memory
    fn read_u32(&self, address: usize) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_u32(&bytes))
    }

    /// Read a u64 from memory
    fn read_u64(&self, address: usize) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes))
    }

    /// Read a pointer (usize) from memory
    fn read_ptr(&self, address: usize) -> Result<usize> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes) as usize)
    }

    /// Cheap read proving the process is still there.
    fn probe(&self) -> Result<()> {
        let region = self
            .regions()
            .iter()
            .find(|r| r.is_readable())
            .ok_or_else(|| Error::MemoryRead {
                address: 0,
                size: 1,
                reason: "process has no readable regions".to_string(),
            })?;
        self.read_u8(region.start).map(|_| ())
    }

    /// File-backed mappings grouped by path, in address order.
    fn modules(&self) -> Vec<Module<'_>> {
        let mut modules: Vec<Module<'_>> = Vec::new();

        for region in self.regions() {
            let Some(path) = region.path.as_deref() else {
                continue;
            };
            if path.starts_with('[') {
                continue;
            }

            match modules.iter_mut().find(|m| m.path == path) {
                Some(module) => module.regions.push(region),
                None => modules.push(Module {
                    path,
                    regions: vec![region],
                }),
            }
        }

        modules
    }
}

/// Finds and attaches to running processes by executable name.
pub trait ProcessProvider: Send + Sync {
    /// Pid of a running process named `name`, if any.
    fn find_process(&self, name: &str) -> Option<u32>;

    /// Attach for memory reading.
    ///
    /// Fails with [`Error::ProcessNotFound`] when nothing named `name` runs.
    fn attach(&self, name: &str) -> Result<Box<dyn MemorySource>>;
}

//! Mock Memory Source
//!
//! An in-memory stand-in for the game process, used by scanner, poller and
//! orchestrator tests.

use super::{MemoryRegion, MemorySource, ProcessProvider};
use crate::error::{Error, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Contiguous buffer mapped at `base_address`, with read logging.
pub struct MockMemorySource {
    data: RwLock<Vec<u8>>,
    pub base_address: usize,
    pub regions: Vec<MemoryRegion>,
    reads: Mutex<Vec<(usize, usize)>>,
    alive: AtomicBool,
}

impl MockMemorySource {
    /// Create a new mock with data at given base address, mapped as gk.exe
    pub fn new(data: Vec<u8>, base_address: usize) -> Self {
        let end = base_address + data.len();
        Self::with_regions(
            data,
            base_address,
            vec![MemoryRegion {
                start: base_address,
                end,
                perms: "rw-p".to_string(),
                offset: 0,
                path: Some("/games/jak2/gk.exe".to_string()),
            }],
        )
    }

    /// Create with multiple regions
    pub fn with_regions(data: Vec<u8>, base_address: usize, regions: Vec<MemoryRegion>) -> Self {
        Self {
            data: RwLock::new(data),
            base_address,
            regions,
            reads: Mutex::new(Vec::new()),
            alive: AtomicBool::new(true),
        }
    }

    pub fn write_bytes(&self, address: usize, bytes: &[u8]) {
        let offset = address - self.base_address;
        let mut data = self.data.write().unwrap();
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_u32(&self, address: usize, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_u64(&self, address: usize, value: u64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Make every later read fail, as if the process exited.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Every (address, size) read so far.
    pub fn reads(&self) -> Vec<(usize, usize)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn clear_reads(&self) {
        self.reads.lock().unwrap().clear();
    }

    /// Whether any logged read overlaps `[start, end)`.
    pub fn was_read_between(&self, start: usize, end: usize) -> bool {
        self.reads()
            .iter()
            .any(|&(address, size)| address < end && address.saturating_add(size) > start)
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        self.reads.lock().unwrap().push((address, size));

        let fail = |reason: &str| Error::MemoryRead {
            address,
            size,
            reason: reason.to_string(),
        };

        if !self.alive.load(Ordering::SeqCst) {
            return Err(fail("process exited"));
        }
        if address < self.base_address {
            return Err(fail("below mapped data"));
        }

        let data = self.data.read().unwrap();
        let offset = address - self.base_address;
        if offset.checked_add(size).map_or(true, |end| end > data.len()) {
            return Err(fail("past end of mapped data"));
        }

        Ok(data[offset..offset + size].to_vec())
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    fn pid(&self) -> u32 {
        4242
    }
}

impl MemorySource for Arc<MockMemorySource> {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        self.as_ref().read_bytes(address, size)
    }

    fn regions(&self) -> &[MemoryRegion] {
        self.as_ref().regions()
    }

    fn pid(&self) -> u32 {
        self.as_ref().pid()
    }
}

/// Hands out one shared mock for every attach.
pub struct MockProcessProvider {
    pub source: Option<Arc<MockMemorySource>>,
    pub running: Vec<String>,
}

impl MockProcessProvider {
    pub fn new(source: Arc<MockMemorySource>, running: &[&str]) -> Self {
        Self {
            source: Some(source),
            running: running.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            source: None,
            running: Vec::new(),
        }
    }
}

impl ProcessProvider for MockProcessProvider {
    fn find_process(&self, name: &str) -> Option<u32> {
        self.running.iter().any(|p| p == name).then_some(4242)
    }

    fn attach(&self, name: &str) -> Result<Box<dyn MemorySource>> {
        match (&self.source, self.find_process(name)) {
            (Some(source), Some(_)) => Ok(Box::new(Arc::clone(source))),
            _ => Err(Error::ProcessNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_bytes() {
        let source = MockMemorySource::new(vec![0x41, 0x42, 0x43, 0x44], 0x1000);

        assert_eq!(source.read_bytes(0x1000, 4).unwrap(), b"ABCD");
        assert_eq!(source.read_bytes(0x1001, 2).unwrap(), b"BC");
    }

    #[test]
    fn test_mock_source_little_endian_reads() {
        let data = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let source = MockMemorySource::new(data, 0x1000);

        assert_eq!(source.read_u64(0x1000).unwrap(), 0x0807060504030201);
        assert_eq!(source.read_u32(0x1000).unwrap(), 0x04030201);
        assert_eq!(source.read_u8(0x1007).unwrap(), 0x08);
    }

    #[test]
    fn test_mock_source_read_out_of_bounds() {
        let source = MockMemorySource::new(vec![0; 4], 0x1000);

        assert!(source.read_bytes(0x1002, 10).is_err());
        assert!(source.read_bytes(0x500, 4).is_err());
    }

    #[test]
    fn test_mock_source_writes_and_logs() {
        let source = MockMemorySource::new(vec![0; 16], 0x1000);
        source.write_u32(0x1004, 0xdeadbeef);

        assert_eq!(source.read_u32(0x1004).unwrap(), 0xdeadbeef);
        assert_eq!(source.reads(), vec![(0x1004, 4)]);
        assert!(source.was_read_between(0x1006, 0x1010));
        assert!(!source.was_read_between(0x1008, 0x1010));
    }

    #[test]
    fn test_killed_source_fails_probe() {
        let source = MockMemorySource::new(vec![0; 16], 0x1000);
        assert!(source.probe().is_ok());

        source.kill();
        assert!(matches!(source.probe(), Err(Error::MemoryRead { .. })));
    }

    #[test]
    fn test_modules_group_by_path() {
        let regions = vec![
            MemoryRegion {
                start: 0x1000,
                end: 0x2000,
                perms: "r-xp".to_string(),
                offset: 0,
                path: Some("/games/gk.exe".to_string()),
            },
            MemoryRegion {
                start: 0x2000,
                end: 0x3000,
                perms: "rw-p".to_string(),
                offset: 0,
                path: None,
            },
            MemoryRegion {
                start: 0x3000,
                end: 0x4000,
                perms: "r--p".to_string(),
                offset: 0x2000,
                path: Some("/games/gk.exe".to_string()),
            },
            MemoryRegion {
                start: 0x4000,
                end: 0x5000,
                perms: "r--p".to_string(),
                offset: 0,
                path: Some("[heap]".to_string()),
            },
        ];
        let source = MockMemorySource::with_regions(vec![0; 0x4000], 0x1000, regions);

        let modules = source.modules();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name(), "gk.exe");
        assert_eq!(modules[0].regions.len(), 2);
    }

    #[test]
    fn test_provider_attach() {
        let source = Arc::new(MockMemorySource::new(vec![0; 16], 0x1000));
        let provider = MockProcessProvider::new(Arc::clone(&source), &["gk.exe"]);

        assert!(provider.attach("gk.exe").is_ok());
        assert!(matches!(
            provider.attach("goalc.exe"),
            Err(Error::ProcessNotFound(_))
        ));
        assert!(MockProcessProvider::empty().attach("gk.exe").is_err());
    }
}

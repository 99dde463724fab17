//! Memory Region Types
//!
//! Mapped ranges of a process, as listed by /proc/pid/maps.

/// A memory region from /proc/pid/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub offset: usize,
    pub path: Option<String>,
}

impl MemoryRegion {
    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }
}

/// A loaded module: every mapping backed by the same file.
#[derive(Debug, Clone)]
pub struct Module<'a> {
    pub path: &'a str,
    pub regions: Vec<&'a MemoryRegion>,
}

impl Module<'_> {
    /// File name without directories, for log messages.
    pub fn name(&self) -> &str {
        self.path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.path)
    }
}

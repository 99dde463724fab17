//! Live Process Memory Source
//!
//! Finds the game and compiler processes by name and reads the game's
//! memory through `process-memory`.

use jak2_ap::{Error, MemoryRegion, MemorySource, ProcessProvider};
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use sysinfo::System;
use tracing::debug;

/// An attached game process
pub struct LiveProcess {
    pid: u32,
    handle: ProcessHandle,
    maps: Vec<MemoryRegion>,
}

// SAFETY: Windows HANDLEs are process-wide and can be safely used from any thread.
unsafe impl Send for LiveProcess {}
unsafe impl Sync for LiveProcess {}

impl MemorySource for LiveProcess {
    fn read_bytes(&self, address: usize, size: usize) -> jak2_ap::Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.handle
            .copy_address(address, &mut buffer)
            .map_err(|e| Error::MemoryRead {
                address,
                size,
                reason: e.to_string(),
            })?;
        Ok(buffer)
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.maps
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}

/// Looks processes up through sysinfo.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveProcessProvider;

impl ProcessProvider for LiveProcessProvider {
    fn find_process(&self, name: &str) -> Option<u32> {
        find_process(name)
    }

    fn attach(&self, name: &str) -> jak2_ap::Result<Box<dyn MemorySource>> {
        let pid = find_process(name).ok_or_else(|| Error::ProcessNotFound(name.to_string()))?;
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| attach_error(pid, "open process", &e))?;
        let maps = read_maps(pid).map_err(|e| attach_error(pid, "read memory map", &e))?;

        debug!(pid, regions = maps.len(), "attached to {}", name);

        Ok(Box::new(LiveProcess { pid, handle, maps }))
    }
}

fn attach_error(pid: u32, step: &str, error: &std::io::Error) -> Error {
    Error::Attach {
        pid,
        reason: format!("{}: {}", step, error),
    }
}

/// Find a running process by executable name.
///
/// Matches the process name or the first command line argument, ignoring
/// case, directories and a trailing `.exe`. When several match (threads,
/// helper processes) the one using the most memory wins.
pub fn find_process(name: &str) -> Option<u32> {
    let system = System::new_all();

    let mut candidates: Vec<(u32, u64)> = Vec::new();

    for process in system.processes().values() {
        let pid = process.pid().as_u32();
        let process_name = process.name().to_string_lossy();
        let first_arg = process
            .cmd()
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default();

        if matches_process(&process_name, name) || matches_process(&first_arg, name) {
            let tgid = get_tgid(pid).unwrap_or(pid);
            candidates.push((tgid, process.memory()));
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.first().map(|(pid, _)| *pid)
}

/// Whether `candidate` (a process name or path) names the executable `wanted`.
pub fn matches_process(candidate: &str, wanted: &str) -> bool {
    fn normalize(s: &str) -> String {
        let base = s.rsplit(['/', '\\']).next().unwrap_or(s).to_ascii_lowercase();
        match base.strip_suffix(".exe") {
            Some(stem) => stem.to_string(),
            None => base,
        }
    }

    let wanted = normalize(wanted);
    !wanted.is_empty() && normalize(candidate) == wanted
}

/// Get the thread group ID (main process) for a given PID/TID
#[cfg(target_os = "linux")]
fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    parse_tgid(&status)
}

#[cfg(not(target_os = "linux"))]
fn get_tgid(_pid: u32) -> Option<u32> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_tgid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Tgid:"))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Memory regions of `pid` from /proc/pid/maps
#[cfg(target_os = "linux")]
fn read_maps(pid: u32) -> std::io::Result<Vec<MemoryRegion>> {
    let contents = std::fs::read_to_string(format!("/proc/{}/maps", pid))?;
    Ok(parse_maps(&contents))
}

// No maps listing elsewhere; the scanner then finds no modules and reports
// the marker as missing.
#[cfg(not(target_os = "linux"))]
fn read_maps(_pid: u32) -> std::io::Result<Vec<MemoryRegion>> {
    Ok(Vec::new())
}

/// Parse the text of /proc/pid/maps
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn parse_maps(contents: &str) -> Vec<MemoryRegion> {
    let mut regions = Vec::new();

    for line in contents.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((start, end)) = parts.first().and_then(|range| range.split_once('-')) else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            usize::from_str_radix(start, 16),
            usize::from_str_radix(end, 16),
        ) else {
            continue;
        };

        let perms = parts.get(1).unwrap_or(&"").to_string();
        let offset = parts
            .get(2)
            .and_then(|s| usize::from_str_radix(s, 16).ok())
            .unwrap_or(0);
        // paths may contain spaces (Wine prefixes, Steam libraries)
        let path = (parts.len() > 5).then(|| parts[5..].join(" "));

        regions.push(MemoryRegion {
            start,
            end,
            perms,
            offset,
            path,
        });
    }

    regions
}

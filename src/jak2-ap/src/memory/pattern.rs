//! Byte signature scanning
//!
//! Thin wrapper over memchr's SIMD-accelerated `memmem` finder, plus the
//! windowing used to read large regions piecewise.

use memchr::memmem;

/// Offset of the first occurrence of `needle` in `data`.
pub fn find_first(data: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    memmem::find(data, needle)
}

/// Split `[start, end)` into windows of at most `chunk` bytes that overlap
/// by `overlap` bytes, so a needle of `overlap + 1` bytes straddling a
/// boundary is still fully contained in one window.
pub fn chunk_windows(start: usize, end: usize, chunk: usize, overlap: usize) -> Vec<(usize, usize)> {
    assert!(chunk > overlap, "chunk must be larger than the overlap");

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let window_end = end.min(cursor + chunk);
        windows.push((cursor, window_end - cursor));
        if window_end == end {
            break;
        }
        cursor = window_end - overlap;
    }
    windows
}

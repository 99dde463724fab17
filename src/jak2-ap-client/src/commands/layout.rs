//! Layout command handler
//!
//! Prints where each field of the `ap-info-jak2` structure lives, the same
//! table `memr structure` shows for a connected game.

use anyhow::{Context, Result};
use jak2_ap::{BlockLayout, LayoutField};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
struct LayoutReport {
    version: u32,
    total_size: usize,
    fields: Vec<LayoutField>,
}

/// Handle the layout command
pub fn handle(version: Option<u32>, json: bool) -> Result<()> {
    let layout = version.map_or_else(BlockLayout::current, BlockLayout::for_version);

    if json {
        let report = LayoutReport {
            version: layout.version,
            total_size: layout.total_size,
            fields: layout.fields(),
        };
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize layout")?;
        println!("{}", output);
    } else {
        print!("{}", render_table(&layout, None));
    }

    Ok(())
}

/// Field table. With `base`, each row also gets its absolute address.
pub fn render_table(layout: &BlockLayout, base: Option<usize>) -> String {
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(
        out,
        "Structure version {} ({} bytes)",
        layout.version, layout.total_size
    );
    let _ = writeln!(out, "{:<26} {:>8} {:>5} {:>6}", "Field", "Offset", "Size", "Count");

    for field in layout.fields() {
        let _ = write!(
            out,
            "{:<26} {:>8} {:>5} {:>6}",
            field.name,
            format!("{:#x}", field.offset),
            field.size,
            field.count
        );
        if let Some(base) = base {
            let _ = write!(out, "  @ {:#x}", base + field.offset);
        }
        out.push('\n');
    }

    out
}

//! Scan command: dry run of the patch engine.

use std::path::Path;

use anyhow::{Context, Result};
use respatch::{Error, PatchEngine, PatternTable, Resolution};

/// Run the scan command
pub fn run(file: &Path, table: &PatternTable, target: Resolution) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    println!(
        "Scanning {} ({} bytes) for {} patterns, target {}",
        file.display(),
        bytes.len(),
        table.len(),
        target
    );
    println!();

    let plan = PatchEngine::new(table).plan(&bytes, target);
    for (i, op) in plan.ops.iter().enumerate() {
        println!("[{}] {}", i + 1, op.log_line());
    }

    let overlaps = plan.overlaps();
    if !overlaps.is_empty() {
        println!();
        for (a, b) in &overlaps {
            println!(
                "Overlap: [{}] {} / [{}] {} (the later one wins)",
                a + 1,
                plan.ops[*a].pattern,
                b + 1,
                plan.ops[*b].pattern
            );
        }
    }

    println!();
    println!("{} patch(es) would be applied", plan.ops.len());
    if plan.skipped > 0 {
        println!("{} match(es) skipped (field past end of file)", plan.skipped);
    }

    if plan.is_empty() {
        return Err(Error::NoSignatureMatch {
            scanned: bytes.len(),
        }
        .into());
    }

    Ok(())
}

//! Signatures command: show or export the pattern table.

use std::path::Path;

use anyhow::Result;
use respatch::{PatternTable, save_table};

/// Run the signatures command
pub fn run(table: &PatternTable, export: Option<&Path>) -> Result<()> {
    if let Some(path) = export {
        save_table(path, table)?;
        println!("Exported {} patterns to {}", table.len(), path.display());
        return Ok(());
    }

    println!("Pattern table: {} ({} patterns)", table.version(), table.len());
    println!();
    for line in format_table(table) {
        println!("{}", line);
    }

    Ok(())
}

fn format_table(table: &PatternTable) -> Vec<String> {
    let name_width = table.iter().map(|p| p.name().len()).max().unwrap_or(0);

    table
        .iter()
        .map(|pattern| {
            let kind = pattern.kind();
            format!(
                "{:<name_width$}  {:<14}  +{}  {}",
                pattern.name(),
                pattern.category().to_string(),
                kind.write_offset(),
                pattern.signature(),
            )
        })
        .collect()
}

//! Hex offset parsing and formatting utilities.

use anyhow::Result;

/// Parse a hex file offset (with or without 0x prefix).
pub fn parse_hex_offset(s: &str) -> Result<usize> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    usize::from_str_radix(s, 16).map_err(|e| anyhow::anyhow!("Invalid hex offset: {}", e))
}

/// Format an offset as a hex string with 0x prefix.
pub fn format_hex_offset(offset: usize) -> String {
    format!("0x{:X}", offset)
}

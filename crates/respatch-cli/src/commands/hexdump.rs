//! Hexdump command implementation.
//!
//! Displays file bytes in traditional hexdump format, handy for checking a
//! field listed by `scan` or in a patch report.
//!
//! # Output Format
//!
//! ```text
//! 0x0001A2B0: C7 45 F8 00 0A 00 00 B8  00 0A 00 00 90 90 90 90  |.E..............|
//! ```

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::hex_utils::{format_hex_offset, parse_hex_offset};

/// Run the hexdump command
pub fn run(file: &Path, offset: &str, size: usize, ascii: bool) -> Result<()> {
    let offset = parse_hex_offset(offset)?;
    let bytes = read_range(file, offset, size)?;

    println!(
        "Hexdump of {} at {} ({} bytes):",
        file.display(),
        format_hex_offset(offset),
        bytes.len()
    );
    println!();

    for line in format_lines(&bytes, offset, ascii) {
        println!("{}", line);
    }

    Ok(())
}

/// Read up to `size` bytes at `offset`; stops early at end of file.
fn read_range(file: &Path, offset: usize, size: usize) -> Result<Vec<u8>> {
    let mut f = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let len = f.metadata()?.len();
    if offset as u64 >= len {
        bail!(
            "Offset {} is past the end of the file ({} bytes)",
            format_hex_offset(offset),
            len
        );
    }

    f.seek(SeekFrom::Start(offset as u64))?;
    let mut bytes = Vec::with_capacity(size);
    f.take(size as u64).read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn format_lines(bytes: &[u8], base: usize, ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:08X}: ", base + i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                line.push_str(" |");
                for byte in chunk {
                    if (0x20..0x7F).contains(byte) {
                        line.push(*byte as char);
                    } else {
                        line.push('.');
                    }
                }
                for _ in chunk.len()..16 {
                    line.push(' ');
                }
                line.push('|');
            }

            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_full_line() {
        let bytes: Vec<u8> = (0x41..0x51).collect();
        let lines = format_lines(&bytes, 0x100, true);
        assert_eq!(
            lines,
            vec![
                "0x00000100: 41 42 43 44 45 46 47 48  49 4A 4B 4C 4D 4E 4F 50  |ABCDEFGHIJKLMNOP|"
            ]
        );
    }

    #[test]
    fn test_format_partial_line() {
        let lines = format_lines(&[0x00, 0x0F, 0x00, 0x00], 0x1D, false);
        assert_eq!(lines, vec!["0x0000001D: 00 0F 00 00"]);

        let lines = format_lines(&[0xC7, 0x45], 0, true);
        assert_eq!(
            lines,
            vec![format!(
                "0x00000000: C7 45 {}|.E{}|",
                " ".repeat(44),
                " ".repeat(14)
            )]
        );
    }

    #[test]
    fn test_read_range_stops_at_end() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [1u8, 2, 3, 4, 5]).unwrap();

        assert_eq!(read_range(file.path(), 3, 16).unwrap(), vec![4, 5]);
        assert!(read_range(file.path(), 5, 1).is_err());
    }
}

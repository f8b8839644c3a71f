//! Scanner: pattern occurrences in a flat byte buffer.

use crate::pattern::Pattern;
use crate::signature::Matches;

/// One occurrence of a pattern's signature.
#[derive(Debug, Clone, Copy)]
pub struct Match<'p> {
    pub pattern: &'p Pattern,
    /// Absolute offset of the first signature byte
    pub start: usize,
}

/// Lazy iterator returned by [`scan`].
pub struct Scan<'p, 'b> {
    pattern: &'p Pattern,
    matches: Matches<'p, 'b>,
}

impl<'p> Iterator for Scan<'p, '_> {
    type Item = Match<'p>;

    fn next(&mut self) -> Option<Match<'p>> {
        let start = self.matches.next()?;
        Some(Match {
            pattern: self.pattern,
            start,
        })
    }
}

/// Scan `buffer` for `pattern`, left to right, without overlap between
/// matches of the same pattern.
pub fn scan<'p, 'b>(buffer: &'b [u8], pattern: &'p Pattern) -> Scan<'p, 'b> {
    Scan {
        pattern,
        matches: pattern.signature().find_iter(buffer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::builtin_table;

    #[test]
    fn test_scan_reports_pattern_and_offsets() {
        let pattern = builtin_table().get("Getter Height").unwrap();
        let mut buffer = vec![0x90u8; 40];
        buffer[4..9].copy_from_slice(&[0xB8, 0xD0, 0x02, 0x00, 0x00]);
        buffer[30..35].copy_from_slice(&[0xB8, 0xD0, 0x02, 0x00, 0x00]);

        let matches: Vec<_> = scan(&buffer, pattern).collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].start, 4);
        assert_eq!(matches[1].start, 30);
        assert_eq!(matches[0].pattern.name(), "Getter Height");
    }

    #[test]
    fn test_patterns_scan_independently() {
        // The Init Width signature contains the Backbuffer Size anchor;
        // both must be found in the same bytes.
        let buffer = [
            0xC7, 0x45, 0xF0, 0x00, 0x05, 0x00, 0x00, 0xD0, 0x02, 0x00, 0x00,
        ];
        let table = builtin_table();
        let init = scan(&buffer, table.get("Init Width").unwrap()).count();
        let pair = scan(&buffer, table.get("Backbuffer Size").unwrap()).count();
        assert_eq!(init, 1);
        assert_eq!(pair, 1);
    }
}

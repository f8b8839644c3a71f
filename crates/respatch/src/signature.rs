//! Byte signatures with wildcard positions.
//!
//! Signatures are written as space separated hex bytes, with `??` (or `?`)
//! marking a position that matches any byte:
//!
//! ```text
//! C7 45 ?? 00 05 00 00
//! ```
//!
//! A [`Signature`] is compiled once: the longest run of literal bytes becomes
//! the anchor handed to `memchr::memmem`, and the full signature is verified
//! around every anchor hit.

use std::fmt;

use memchr::memmem::Finder;

use crate::error::{Error, Result};

/// One position of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigByte {
    Literal(u8),
    Any,
}

impl SigByte {
    #[inline]
    pub fn matches(self, byte: u8) -> bool {
        match self {
            Self::Literal(value) => value == byte,
            Self::Any => true,
        }
    }
}

/// A compiled signature.
#[derive(Clone)]
pub struct Signature {
    bytes: Vec<SigByte>,
    anchor_offset: usize,
    /// `None` when every position is a wildcard
    finder: Option<Finder<'static>>,
}

impl Signature {
    pub fn new(bytes: Vec<SigByte>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }

        let (anchor_offset, anchor) = find_best_anchor(&bytes);
        let finder = if anchor.is_empty() {
            None
        } else {
            Some(Finder::new(&anchor).into_owned())
        };

        Ok(Self {
            bytes,
            anchor_offset,
            finder,
        })
    }

    /// Parse and compile a signature from its text form.
    pub fn parse(pattern: &str) -> Result<Self> {
        Self::new(parse_pattern(pattern)?)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[SigByte] {
        &self.bytes
    }

    /// Check whether the signature matches `haystack` starting at `pos`.
    pub fn matches_at(&self, haystack: &[u8], pos: usize) -> bool {
        let Some(window) = haystack.get(pos..pos + self.bytes.len()) else {
            return false;
        };
        self.bytes
            .iter()
            .zip(window)
            .all(|(sig, &byte)| sig.matches(byte))
    }

    /// Iterate over the start offsets of all non-overlapping matches in
    /// `haystack`, in ascending order.
    pub fn find_iter<'s, 'h>(&'s self, haystack: &'h [u8]) -> Matches<'s, 'h> {
        Matches {
            signature: self,
            haystack,
            pos: 0,
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature")
            .field(&format_pattern(&self.bytes))
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pattern(&self.bytes))
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Signature {}

/// Lazy iterator over match offsets, see [`Signature::find_iter`].
///
/// Scanning resumes after the end of the previous match, so matches of one
/// signature never overlap each other.
pub struct Matches<'s, 'h> {
    signature: &'s Signature,
    haystack: &'h [u8],
    /// Smallest start offset still to be tried
    pos: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let sig = self.signature;
        let len = sig.len();

        loop {
            if self.pos.checked_add(len)? > self.haystack.len() {
                return None;
            }

            let start = match &sig.finder {
                Some(finder) => {
                    let from = self.pos + sig.anchor_offset;
                    let hit = finder.find(&self.haystack[from..])?;
                    from + hit - sig.anchor_offset
                }
                None => self.pos,
            };

            // Anchor hits only move forward, so a hit without room for the
            // full signature ends the scan.
            if start + len > self.haystack.len() {
                self.pos = self.haystack.len();
                return None;
            }

            if sig.matches_at(self.haystack, start) {
                self.pos = start + len;
                return Some(start);
            }
            self.pos = start + 1;
        }
    }
}

/// Longest contiguous run of literal bytes, as `(offset, bytes)`.
fn find_best_anchor(bytes: &[SigByte]) -> (usize, Vec<u8>) {
    let mut best = (0, 0);
    let mut run_start = 0;

    for (i, byte) in bytes.iter().enumerate() {
        if let SigByte::Any = byte {
            run_start = i + 1;
            continue;
        }
        let run_len = i + 1 - run_start;
        if run_len > best.1 {
            best = (run_start, run_len);
        }
    }

    let (offset, len) = best;
    let anchor = bytes[offset..offset + len]
        .iter()
        .filter_map(|b| match b {
            SigByte::Literal(value) => Some(*value),
            SigByte::Any => None,
        })
        .collect();
    (offset, anchor)
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<SigByte>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            bytes.push(SigByte::Any);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
        })?;
        bytes.push(SigByte::Literal(value));
    }

    if bytes.is_empty() {
        return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[SigByte]) -> String {
    bytes
        .iter()
        .map(|b| match b {
            SigByte::Literal(value) => format!("{:02X}", value),
            SigByte::Any => "??".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(pattern: &str, haystack: &[u8]) -> Vec<usize> {
        Signature::parse(pattern).unwrap().find_iter(haystack).collect()
    }

    #[test]
    fn test_parse_pattern_with_wildcards() {
        let bytes = parse_pattern("C7 45 ?? 00 05 00 00").unwrap();
        assert_eq!(bytes.len(), 7);
        assert_eq!(bytes[0], SigByte::Literal(0xC7));
        assert_eq!(bytes[1], SigByte::Literal(0x45));
        assert_eq!(bytes[2], SigByte::Any);
        assert_eq!(bytes[3], SigByte::Literal(0x00));
    }

    #[test]
    fn test_parse_pattern_rejects_bad_input() {
        assert!(parse_pattern("").is_err());
        assert!(parse_pattern("   ").is_err());
        assert!(parse_pattern("C7 XY").is_err());
        assert!(parse_pattern("C7 145").is_err());
    }

    #[test]
    fn test_format_pattern_roundtrip() {
        let pattern = vec![
            SigByte::Literal(0xB8),
            SigByte::Any,
            SigByte::Literal(0x05),
            SigByte::Literal(0xFF),
        ];
        let formatted = format_pattern(&pattern);
        assert_eq!(formatted, "B8 ?? 05 FF");
        assert_eq!(parse_pattern(&formatted).unwrap(), pattern);
    }

    #[test]
    fn test_best_anchor_is_longest_literal_run() {
        let bytes = parse_pattern("C7 45 ?? 00 05 00 00").unwrap();
        let (offset, anchor) = find_best_anchor(&bytes);
        assert_eq!(offset, 3);
        assert_eq!(anchor, vec![0x00, 0x05, 0x00, 0x00]);
    }

    #[test]
    fn test_find_with_wildcard() {
        let haystack = [0x90, 0xC7, 0x45, 0xF8, 0x00, 0x05, 0x00, 0x00, 0x90];
        assert_eq!(find_all("C7 45 ?? 00 05 00 00", &haystack), vec![1]);
    }

    #[test]
    fn test_find_multiple_in_ascending_order() {
        let mut haystack = vec![0u8; 32];
        haystack[2..7].copy_from_slice(&[0xB8, 0x00, 0x05, 0x00, 0x00]);
        haystack[20..25].copy_from_slice(&[0xB8, 0x00, 0x05, 0x00, 0x00]);
        assert_eq!(find_all("B8 00 05 00 00", &haystack), vec![2, 20]);
    }

    #[test]
    fn test_find_is_non_overlapping() {
        let haystack = [0xAA; 5];
        assert_eq!(find_all("AA AA", &haystack), vec![0, 2]);
    }

    #[test]
    fn test_find_does_not_skip_overlapping_anchor_candidates() {
        // The first anchor hit at 0 fails verification; the real match
        // starts one byte later.
        let haystack = [0x00, 0x00, 0x00, 0x01];
        assert_eq!(find_all("00 ?? 01", &haystack), vec![1]);
    }

    #[test]
    fn test_find_all_wildcards() {
        let haystack = [1, 2, 3, 4, 5];
        assert_eq!(find_all("?? ??", &haystack), vec![0, 2]);
    }

    #[test]
    fn test_find_ignores_partial_match_at_end() {
        let haystack = [0x00, 0xC7, 0x45, 0x11, 0x00, 0x05, 0x00];
        assert!(find_all("C7 45 ?? 00 05 00 00", &haystack).is_empty());
    }

    #[test]
    fn test_find_treats_newlines_as_plain_bytes() {
        let haystack = [0xC7, 0x45, b'\n', 0x00, 0x05, 0x00, 0x00];
        assert_eq!(find_all("C7 45 ?? 00 05 00 00", &haystack), vec![0]);
    }

    #[test]
    fn test_find_iter_is_restartable() {
        let sig = Signature::parse("B8 ?? 05").unwrap();
        let haystack = [0xB8, 0x01, 0x05, 0xB8, 0x02, 0x05];
        let first: Vec<_> = sig.find_iter(&haystack).collect();
        let second: Vec<_> = sig.find_iter(&haystack).collect();
        assert_eq!(first, vec![0, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_haystack_shorter_than_signature() {
        assert!(find_all("B8 00 05 00 00", &[0xB8, 0x00]).is_empty());
        assert!(find_all("B8", &[]).is_empty());
    }
}

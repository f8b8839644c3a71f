//! Patch Engine.
//!
//! Patching runs in fixed phases:
//!
//! 1. Scanning: every pattern, in table order, is scanned against the
//!    untouched source bytes and each match becomes one [`PatchOp`].
//! 2. Applying: the ops are written, in the order they were produced, into a
//!    fresh copy of the source.
//!
//! The source buffer is never modified and the output always has the same
//! length as the input. When two ops cover the same bytes the one produced
//! later wins; such overlaps are reported but not prevented.

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::encode::{FieldBytes, FieldValue, encode};
use crate::error::{Error, Result};
use crate::pattern::{Category, PatternTable};
use crate::resolution::Resolution;
use crate::scan::scan;

/// A single fixed-width overwrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOp {
    pub pattern: String,
    pub category: Category,
    /// Absolute offset of the first written byte
    pub offset: usize,
    #[serde(skip)]
    pub bytes: FieldBytes,
    pub value: FieldValue,
}

impl PatchOp {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.bytes.len())
    }

    pub fn log_line(&self) -> String {
        format!("{} @ 0x{:08X} -> {}", self.pattern, self.offset, self.value)
    }

    /// Whether two ops write different bytes to a shared position.
    fn conflicts_with(&self, other: &PatchOp) -> bool {
        let start = self.offset.max(other.offset);
        let end = self.range().end.min(other.range().end);
        (start..end).any(|pos| {
            self.bytes.as_slice()[pos - self.offset] != other.bytes.as_slice()[pos - other.offset]
        })
    }
}

/// Output of the scanning phase.
#[derive(Debug, Clone, Default)]
pub struct PatchPlan {
    /// Ops in pattern-then-match order
    pub ops: Vec<PatchOp>,
    /// Matches dropped because their field would run past the end of the buffer
    pub skipped: usize,
}

impl PatchPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Index pairs `(earlier, later)` of ops whose byte ranges intersect.
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        overlapping_pairs(&self.ops)
    }

    /// Write every op into a copy of `source`, in order.
    ///
    /// Plans from [`PatchEngine::plan`] only hold in-bounds ops. Ops added by
    /// hand that do not fit `source` are left out with a warning.
    pub fn apply(&self, source: &[u8]) -> Vec<u8> {
        let mut patched = source.to_vec();
        for op in &self.ops {
            let dest = op
                .offset
                .checked_add(op.bytes.len())
                .and_then(|end| patched.get_mut(op.offset..end));
            match dest {
                Some(dest) => dest.copy_from_slice(op.bytes.as_slice()),
                None => warn!("{} lies outside the buffer, not applied", op.log_line()),
            }
        }
        patched
    }
}

/// Result of a successful patch.
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub applied_count: usize,
    /// One line per op, in scan order
    pub log: Vec<String>,
    pub ops: Vec<PatchOp>,
    pub skipped: usize,
    /// Same length as the source
    pub patched: Vec<u8>,
}

impl PatchResult {
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        overlapping_pairs(&self.ops)
    }
}

fn overlapping_pairs(ops: &[PatchOp]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..ops.len()).collect();
    order.sort_by_key(|&i| (ops[i].offset, i));

    let mut active: Vec<usize> = Vec::new();
    let mut pairs = Vec::new();
    for i in order {
        let offset = ops[i].offset;
        active.retain(|&j| ops[j].range().end > offset);
        pairs.extend(active.iter().map(|&j| (j.min(i), j.max(i))));
        active.push(i);
    }

    pairs.sort_unstable();
    pairs
}

pub struct PatchEngine<'t> {
    table: &'t PatternTable,
}

impl<'t> PatchEngine<'t> {
    pub fn new(table: &'t PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t PatternTable {
        self.table
    }

    /// Scan `source` with every pattern and compute the writes for `target`.
    pub fn plan(&self, source: &[u8], target: Resolution) -> PatchPlan {
        let mut plan = PatchPlan::default();

        for pattern in self.table {
            let mut found = 0usize;
            for m in scan(source, pattern) {
                let field = encode(pattern.kind(), target);
                let offset = m.start.checked_add(field.delta).filter(|offset| {
                    offset
                        .checked_add(field.bytes.len())
                        .is_some_and(|end| end <= source.len())
                });
                let Some(offset) = offset else {
                    warn!(
                        "{} at 0x{:X}: field runs past end of file, skipped",
                        pattern.name(),
                        m.start
                    );
                    plan.skipped += 1;
                    continue;
                };

                let op = PatchOp {
                    pattern: pattern.name().to_string(),
                    category: pattern.category(),
                    offset,
                    bytes: field.bytes,
                    value: field.value,
                };

                debug!("  {}", op.log_line());
                plan.ops.push(op);
                found += 1;
            }
            debug!("  {}: {} match(es)", pattern.name(), found);
        }

        for (a, b) in plan.overlaps() {
            let (first, second) = (&plan.ops[a], &plan.ops[b]);
            if first.conflicts_with(second) {
                warn!(
                    "Overlapping patches: '{}' is overwritten by '{}'",
                    first.log_line(),
                    second.log_line()
                );
            } else {
                debug!(
                    "Overlapping patches write identical bytes: '{}' / '{}'",
                    first.log_line(),
                    second.log_line()
                );
            }
        }

        plan
    }

    /// Patch `source` for `target`.
    ///
    /// Returns [`Error::NoSignatureMatch`] when no pattern matched, which
    /// usually means a wrong or already patched file.
    ///
    /// Patterns whose signature covers the field they write stop matching
    /// once the field changes. Every built-in pattern does, so a buffer
    /// patched with [`builtin_table`](crate::builtin_table) fails with
    /// `NoSignatureMatch` on a second run instead of coming back unchanged.
    /// Patching to the stock 1280x720 leaves the constants, and the
    /// matches, in place.
    pub fn patch(&self, source: &[u8], target: Resolution) -> Result<PatchResult> {
        debug!(
            "Phase 1: Scanning {} bytes with {} patterns (table {})...",
            source.len(),
            self.table.len(),
            self.table.version()
        );
        let plan = self.plan(source, target);

        if plan.is_empty() {
            return Err(Error::NoSignatureMatch {
                scanned: source.len(),
            });
        }

        debug!("Phase 2: Applying {} patches...", plan.ops.len());
        let patched = plan.apply(source);
        debug_assert_eq!(patched.len(), source.len());

        info!("Patched {} locations for {}", plan.ops.len(), target);
        let PatchPlan { ops, skipped } = plan;
        Ok(PatchResult {
            applied_count: ops.len(),
            log: ops.iter().map(PatchOp::log_line).collect(),
            ops,
            skipped,
            patched,
        })
    }
}

/// Patch `source` to `width` x `height` using `table`.
pub fn patch(
    source: &[u8],
    width: u32,
    height: u32,
    table: &PatternTable,
) -> Result<PatchResult> {
    PatchEngine::new(table).patch(source, Resolution::new(width, height))
}

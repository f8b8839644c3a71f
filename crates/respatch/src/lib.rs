//! # respatch
//!
//! Signature scan-and-patch engine for changing the hard-coded render
//! resolution of a pre-linked executable.
//!
//! This crate provides:
//! - Byte signatures with wildcards, compiled once and scanned with `memchr`
//! - The Pattern Table (built-in or loaded from JSON)
//! - The Value Encoder and Patch Engine (in-place, fixed-width overwrites)
//! - Output placement, backup and the external unpack step used by front ends
//!
//! ```ignore
//! use respatch::{builtin_table, patch};
//!
//! let bytes = std::fs::read("Game.exe")?;
//! let result = patch(&bytes, 2560, 1440, builtin_table())?;
//! println!("Patched {} locations", result.applied_count);
//! ```

pub mod encode;
pub mod engine;
pub mod error;
pub mod output;
pub mod pattern;
pub mod prelude;
pub mod report;
pub mod resolution;
pub mod scan;
pub mod signature;
pub mod unpack;

pub use encode::{FieldBytes, FieldValue, PatchField, encode};
pub use engine::{PatchEngine, PatchOp, PatchPlan, PatchResult, patch};
pub use error::{Error, Result};
pub use output::{
    PatchOptions, PatchOptionsBuilder, WrittenOutput, backup_path, derived_output_path,
    output_path, write_output,
};
pub use pattern::{
    Category, MAX_WRITE_OFFSET, PatchKind, Pattern, PatternEntry, PatternTable, PatternTableFile,
    Sentinel, builtin_table, load_table, parse_table, save_table,
};
pub use report::PatchReport;
pub use resolution::{Preset, Resolution};
pub use scan::{Match, scan};
pub use signature::{SigByte, Signature, format_pattern, parse_pattern};
pub use unpack::{
    UnpackOutcome, Unpacker, detect_unpacker, is_unpacked, remove_intermediate, unpacked_path,
};

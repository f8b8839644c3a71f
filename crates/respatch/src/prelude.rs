//! Prelude module for convenient imports
//!
//! ```ignore
//! use respatch::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Engine: `PatchEngine`, `PatchResult`, `patch`
//! - Patterns: `Pattern`, `PatchKind`, `PatternTable`, `builtin_table`
//! - Targets: `Resolution`, `Preset`
//! - Output: `PatchOptions`, `Unpacker`
//! - Error handling: `Error`, `Result`

pub use crate::engine::{PatchEngine, PatchResult, patch};
pub use crate::error::{Error, Result};
pub use crate::output::{PatchOptions, write_output};
pub use crate::pattern::{PatchKind, Pattern, PatternTable, builtin_table};
pub use crate::resolution::{Preset, Resolution};
pub use crate::unpack::{UnpackOutcome, Unpacker};

//! Pattern Table: named signatures and what to write when they match.

mod loader;
mod table;

pub use loader::*;
pub use table::*;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{Error, Result};
use crate::signature::Signature;

/// Encoding category of a patched field, as named in pattern table files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[serde(rename = "width")]
    #[strum(serialize = "width")]
    Width,
    #[serde(rename = "height")]
    #[strum(serialize = "height")]
    Height,
    #[serde(rename = "raw_float_pair")]
    #[strum(serialize = "raw_float_pair")]
    RawFloatPair,
    #[serde(rename = "uint_pair")]
    #[strum(serialize = "uint_pair")]
    UIntPair,
    #[serde(rename = "float_bias")]
    #[strum(serialize = "float_bias")]
    FloatBias,
    #[serde(rename = "double_height")]
    #[strum(serialize = "double_height")]
    DoubleHeight,
}

/// Fixed value written by [`PatchKind::FloatBias`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sentinel {
    Single(f32),
    Double(f64),
}

impl Sentinel {
    /// Pick the precision matching a field of `width` bytes.
    pub fn for_width(width: usize, value: f64) -> Result<Self> {
        match width {
            4 => Ok(Self::Single(value as f32)),
            8 => Ok(Self::Double(value)),
            other => Err(Error::InvalidPattern(format!(
                "float bias field must be 4 or 8 bytes wide, got {}",
                other
            ))),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Single(_) => 4,
            Self::Double(_) => 8,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Self::Single(v) => v as f64,
            Self::Double(v) => v,
        }
    }
}

/// Largest distance allowed between a match start and its width or height
/// field. Instruction immediates sit a few bytes into the opcode.
pub const MAX_WRITE_OFFSET: usize = 256;

/// What a pattern writes and where, relative to the match start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchKind {
    /// u32 LE width at `start + offset`
    Width { offset: usize },
    /// u32 LE height at `start + offset`
    Height { offset: usize },
    /// f32 LE width, then f32 LE height, at `start`
    RawFloatPair,
    /// u32 LE width, then u32 LE height, at `start`
    UIntPair,
    /// Tuning constant at `start`, independent of the target resolution
    FloatBias(Sentinel),
    /// f64 LE height at `start`
    DoubleHeight,
}

impl PatchKind {
    pub fn category(&self) -> Category {
        match self {
            Self::Width { .. } => Category::Width,
            Self::Height { .. } => Category::Height,
            Self::RawFloatPair => Category::RawFloatPair,
            Self::UIntPair => Category::UIntPair,
            Self::FloatBias(_) => Category::FloatBias,
            Self::DoubleHeight => Category::DoubleHeight,
        }
    }

    /// Distance from the match start to the first written byte.
    pub fn write_offset(&self) -> usize {
        match self {
            Self::Width { offset } | Self::Height { offset } => *offset,
            _ => 0,
        }
    }

    /// Number of bytes written per match.
    pub fn field_width(&self) -> usize {
        match self {
            Self::Width { .. } | Self::Height { .. } => 4,
            Self::RawFloatPair | Self::UIntPair | Self::DoubleHeight => 8,
            Self::FloatBias(sentinel) => sentinel.width(),
        }
    }
}

/// A named signature plus the field it locates.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    name: String,
    signature: Signature,
    kind: PatchKind,
}

impl Pattern {
    pub fn new(name: impl Into<String>, pattern: &str, kind: PatchKind) -> Result<Self> {
        let name = name.into();
        let signature = Signature::parse(pattern)
            .map_err(|e| Error::InvalidPattern(format!("'{}': {}", name, e)))?;

        if let PatchKind::FloatBias(sentinel) = kind
            && sentinel.width() != signature.len()
        {
            return Err(Error::InvalidPattern(format!(
                "'{}': float bias sentinel is {} bytes but the signature is {} bytes",
                name,
                sentinel.width(),
                signature.len()
            )));
        }

        if kind.write_offset() > MAX_WRITE_OFFSET {
            return Err(Error::InvalidPattern(format!(
                "'{}': write offset {} exceeds {}",
                name,
                kind.write_offset(),
                MAX_WRITE_OFFSET
            )));
        }

        Ok(Self {
            name,
            signature,
            kind,
        })
    }

    /// Float bias pattern whose precision follows the signature width.
    pub fn float_bias(name: impl Into<String>, pattern: &str, value: f64) -> Result<Self> {
        let name = name.into();
        let width = Signature::parse(pattern)?.len();
        let sentinel = Sentinel::for_width(width, value)
            .map_err(|e| Error::InvalidPattern(format!("'{}': {}", name, e)))?;
        Self::new(name, pattern, PatchKind::FloatBias(sentinel))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn kind(&self) -> PatchKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

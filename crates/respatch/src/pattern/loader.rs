//! JSON pattern table files.
//!
//! ```json
//! {
//!   "version": "1.0.3",
//!   "patterns": [
//!     { "name": "Init Width", "pattern": "C7 45 ?? 00 05 00 00", "category": "width", "offset": 3 },
//!     { "name": "Lod Bias", "pattern": "00 00 00 BF", "category": "float_bias", "value": 0.0 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::signature::format_pattern;

use super::{Category, PatchKind, Pattern, PatternTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    pub name: String,
    pub pattern: String,
    /// Kept as text so an unknown category can be reported by name
    pub category: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: usize,
    /// Sentinel for `float_bias` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTableFile {
    pub version: String,
    pub patterns: Vec<PatternEntry>,
}

impl PatternEntry {
    pub fn to_pattern(&self) -> Result<Pattern> {
        let category: Category =
            self.category
                .parse()
                .map_err(|_| Error::UnrecognizedCategory {
                    pattern: self.name.clone(),
                    category: self.category.clone(),
                })?;

        if self.offset != 0 && !matches!(category, Category::Width | Category::Height) {
            return Err(Error::InvalidPattern(format!(
                "'{}': offset only applies to width and height patterns",
                self.name
            )));
        }

        let kind = match category {
            Category::Width => PatchKind::Width {
                offset: self.offset,
            },
            Category::Height => PatchKind::Height {
                offset: self.offset,
            },
            Category::RawFloatPair => PatchKind::RawFloatPair,
            Category::UIntPair => PatchKind::UIntPair,
            Category::DoubleHeight => PatchKind::DoubleHeight,
            Category::FloatBias => {
                let value = self.value.ok_or_else(|| {
                    Error::InvalidPattern(format!("'{}': float_bias needs a value", self.name))
                })?;
                return Pattern::float_bias(self.name.clone(), &self.pattern, value);
            }
        };

        Pattern::new(self.name.clone(), &self.pattern, kind)
    }

    pub fn from_pattern(pattern: &Pattern) -> Self {
        let kind = pattern.kind();
        let value = match kind {
            PatchKind::FloatBias(sentinel) => Some(sentinel.value()),
            _ => None,
        };
        Self {
            name: pattern.name().to_string(),
            pattern: format_pattern(pattern.signature().bytes()),
            category: pattern.category().to_string(),
            offset: kind.write_offset(),
            value,
        }
    }
}

impl PatternTableFile {
    /// Validate every entry and build the table. Fails on the first bad entry.
    pub fn into_table(self) -> Result<PatternTable> {
        let patterns = self
            .patterns
            .iter()
            .map(PatternEntry::to_pattern)
            .collect::<Result<Vec<_>>>()?;
        PatternTable::new(self.version, patterns)
    }

    pub fn from_table(table: &PatternTable) -> Self {
        Self {
            version: table.version().to_string(),
            patterns: table.iter().map(PatternEntry::from_pattern).collect(),
        }
    }
}

pub fn parse_table(json: &str) -> Result<PatternTable> {
    let file: PatternTableFile = serde_json::from_str(json)?;
    file.into_table()
}

pub fn load_table<P: AsRef<Path>>(path: P) -> Result<PatternTable> {
    let content = fs::read_to_string(&path)?;
    let table = parse_table(&content)?;
    debug!(
        "Loaded {} patterns (version {}) from {}",
        table.len(),
        table.version(),
        path.as_ref().display()
    );
    Ok(table)
}

pub fn save_table<P: AsRef<Path>>(path: P, table: &PatternTable) -> Result<()> {
    let content = serde_json::to_string_pretty(&PatternTableFile::from_table(table))?;
    fs::write(path, content)?;
    Ok(())
}

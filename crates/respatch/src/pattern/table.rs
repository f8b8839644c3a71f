use std::sync::LazyLock;

use crate::error::{Error, Result};

use super::{PatchKind, Pattern};

/// Version tag of the built-in table
pub const BUILTIN_VERSION: &str = "builtin";

/// Ordered, validated list of patterns.
///
/// Order decides the log order and, where two patches overlap, which one
/// is written last.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTable {
    version: String,
    patterns: Vec<Pattern>,
}

impl PatternTable {
    pub fn new(version: impl Into<String>, patterns: Vec<Pattern>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::InvalidPattern("Pattern table is empty".to_string()));
        }
        Ok(Self {
            version: version.into(),
            patterns,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns
            .iter()
            .find(|pattern| pattern.name().eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a PatternTable {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

static BUILTIN: LazyLock<PatternTable> = LazyLock::new(|| {
    build_builtin_table().expect("built-in pattern table must be valid")
});

/// The patterns for the stock 1280x720 executable.
pub fn builtin_table() -> &'static PatternTable {
    &BUILTIN
}

fn build_builtin_table() -> Result<PatternTable> {
    let patterns = vec![
        // mov dword ptr [ebp+disp8], 1280 / 720
        Pattern::new("Init Width", "C7 45 ?? 00 05 00 00", PatchKind::Width { offset: 3 })?,
        Pattern::new("Init Height", "C7 45 ?? D0 02 00 00", PatchKind::Height { offset: 3 })?,
        // mov eax, 1280 / 720
        Pattern::new("Getter Width", "B8 00 05 00 00", PatchKind::Width { offset: 1 })?,
        Pattern::new("Getter Height", "B8 D0 02 00 00", PatchKind::Height { offset: 1 })?,
        // 1280.0f, 720.0f
        Pattern::new("Viewport Float", "00 00 A0 44 00 00 34 44", PatchKind::RawFloatPair)?,
        // 1280, 720
        Pattern::new("Backbuffer Size", "00 05 00 00 D0 02 00 00", PatchKind::UIntPair)?,
        // 720.0
        Pattern::new(
            "Projection Height",
            "00 00 00 00 00 80 86 40",
            PatchKind::DoubleHeight,
        )?,
    ];
    PatternTable::new(BUILTIN_VERSION, patterns)
}

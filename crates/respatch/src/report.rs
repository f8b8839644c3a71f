//! JSON report of a patch run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{PatchOp, PatchResult};
use crate::error::Result;
use crate::output::WrittenOutput;
use crate::resolution::Resolution;

#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    pub resolution: Resolution,
    pub table_version: String,
    pub applied_count: usize,
    pub skipped: usize,
    pub patched_at: DateTime<Utc>,
    pub patches: Vec<PatchOp>,
}

impl PatchReport {
    pub fn new(
        input: &Path,
        written: &WrittenOutput,
        resolution: Resolution,
        table_version: &str,
        result: &PatchResult,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            output: written.path.clone(),
            backup: written.backup.clone(),
            resolution,
            table_version: table_version.to_string(),
            applied_count: result.applied_count,
            skipped: result.skipped,
            patched_at: Utc::now(),
            patches: result.ops.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::patch;
    use crate::pattern::builtin_table;

    #[test]
    fn test_report_json_shape() {
        let mut source = vec![0x11u8; 16];
        source[0..5].copy_from_slice(&[0xB8, 0x00, 0x05, 0x00, 0x00]);
        let result = patch(&source, 2560, 1440, builtin_table()).unwrap();
        let written = WrittenOutput {
            path: PathBuf::from("Game_2560x1440.exe"),
            backup: None,
        };

        let report = PatchReport::new(
            Path::new("Game.exe"),
            &written,
            Resolution::new(2560, 1440),
            builtin_table().version(),
            &result,
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["applied_count"], 1);
        assert_eq!(json["resolution"]["width"], 2560);
        assert_eq!(json["patches"][0]["pattern"], "Getter Width");
        assert_eq!(json["patches"][0]["category"], "width");
        assert_eq!(json["patches"][0]["offset"], 1);
        assert_eq!(json["patches"][0]["value"], 2560);
        assert!(json.get("backup").is_none());
    }
}

//! `respatch.toml`: defaults for the patch command.
//!
//! ```toml
//! unpacker = "Steamless/Steamless.CLI.exe"
//! resolution = "1440p"
//! replace_in_place = true
//! keep_backup = true
//! cleanup_unpacked = true
//! patterns = "patterns.json"
//! ```
//!
//! Command line flags take precedence over every value here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use respatch::{PatchOptions, PatternTable, Resolution, builtin_table, load_table};
use serde::Deserialize;

use crate::cli::{PatchArgs, TargetArgs};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub unpacker: Option<PathBuf>,
    pub resolution: Option<String>,
    pub patterns: Option<PathBuf>,
    pub replace_in_place: Option<bool>,
    pub keep_backup: Option<bool>,
    pub cleanup_unpacked: Option<bool>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.as_ref().display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resolution(&self, target: &TargetArgs) -> Result<Resolution> {
        match target.resolution.as_deref().or(self.resolution.as_deref()) {
            Some(text) => Ok(text.parse()?),
            None => Ok(Resolution::default()),
        }
    }

    /// Custom table if one is configured, the built-in table otherwise.
    pub fn pattern_table(&self, target: &TargetArgs) -> Result<PatternTable> {
        match target.patterns.as_ref().or(self.patterns.as_ref()) {
            Some(path) => load_table(path)
                .with_context(|| format!("Failed to load pattern table {}", path.display())),
            None => Ok(builtin_table().clone()),
        }
    }

    pub fn patch_options(&self, args: &PatchArgs) -> PatchOptions {
        PatchOptions::builder()
            .replace_in_place(args.replace || self.replace_in_place.unwrap_or(false))
            .keep_backup(!args.no_backup && self.keep_backup.unwrap_or(true))
            .cleanup_unpacked(!args.keep_unpacked && self.cleanup_unpacked.unwrap_or(true))
            .build()
    }
}

//! Patch command: unpack, patch, write, clean up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use respatch::{
    PatchEngine, PatchOptions, PatchReport, PatchResult, PatternTable, Resolution, UnpackOutcome,
    Unpacker, WrittenOutput, detect_unpacker, is_unpacked, remove_intermediate, write_output,
};
use tracing::{debug, info, warn};

use crate::cli::PatchArgs;
use crate::config::Config;

/// Everything needed to patch one executable
pub struct PatchJob<'a> {
    pub game: &'a Path,
    pub target: Resolution,
    pub table: &'a PatternTable,
    pub unpacker: Option<Unpacker>,
    pub options: PatchOptions,
}

/// Outcome of a successful [`execute`]
#[derive(Debug)]
pub struct PatchSummary {
    pub result: PatchResult,
    pub written: WrittenOutput,
    /// Intermediate unpacked file, if the unpacker produced one
    pub unpacked: Option<PathBuf>,
    pub cleaned_up: bool,
}

/// Run the patch command
pub fn run(args: &PatchArgs, config: &Config) -> Result<()> {
    if !args.game.is_file() {
        bail!("Game executable not found: {}", args.game.display());
    }

    let target = config.resolution(&args.target)?;
    let table = config.pattern_table(&args.target)?;
    let job = PatchJob {
        game: &args.game,
        target,
        table: &table,
        unpacker: resolve_unpacker(args, config),
        options: config.patch_options(args),
    };

    info!("Patching {} to {}...", args.game.display(), target);
    let summary = execute(&job)?;

    for line in &summary.result.log {
        println!("  {}", line);
    }
    println!();
    println!("Patched {} locations!", summary.result.applied_count);
    println!("File saved as: {}", display_name(&summary.written.path));
    if let Some(backup) = &summary.written.backup {
        println!("Backup: {}", display_name(backup));
    }
    if let Some(unpacked) = &summary.unpacked
        && !summary.cleaned_up
    {
        println!("Unpacked copy kept at: {}", unpacked.display());
    }

    if let Some(report_path) = &args.report {
        PatchReport::new(
            &args.game,
            &summary.written,
            target,
            table.version(),
            &summary.result,
        )
        .save(report_path)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}

/// Pick the unpacker: flag, then config, then auto-detection in the
/// working directory.
fn resolve_unpacker(args: &PatchArgs, config: &Config) -> Option<Unpacker> {
    if args.no_unpack {
        return None;
    }

    match args.unpacker.as_ref().or(config.unpacker.as_ref()) {
        Some(path) if path.is_file() => Some(Unpacker::new(path)),
        Some(path) => {
            warn!("Unpacker not found at {}, skipping unpack", path.display());
            None
        }
        None => {
            let cwd = std::env::current_dir().ok()?;
            let detected = detect_unpacker(&cwd);
            if detected.is_none() {
                debug!("No unpacker found in {}", cwd.display());
            }
            detected.map(Unpacker::new)
        }
    }
}

/// Unpack (when possible), patch and write the output.
///
/// A failing or silent unpacker only produces a warning; the original file
/// is patched instead. Nothing is written when no signature matched.
pub fn execute(job: &PatchJob<'_>) -> Result<PatchSummary> {
    let mut source = job.game.to_path_buf();
    let mut unpacked = None;

    if let Some(unpacker) = &job.unpacker {
        if is_unpacked(job.game) {
            debug!("{} is already unpacked", job.game.display());
        } else {
            match unpacker.unpack(job.game) {
                Ok(UnpackOutcome::Unpacked(path)) => {
                    source = path.clone();
                    unpacked = Some(path);
                }
                Ok(UnpackOutcome::NoOutput) => {
                    warn!("Unpacker produced no output, patching the original file (might fail)")
                }
                Err(e) => warn!("{}. Patching the original file instead", e),
            }
        }
    }

    let bytes = fs::read(&source).with_context(|| format!("Failed to read {}", source.display()))?;
    let result = PatchEngine::new(job.table)
        .patch(&bytes, job.target)
        .with_context(|| format!("Failed to patch {}", source.display()))?;

    let written = write_output(job.game, &result.patched, job.target, &job.options)?;

    let mut cleaned_up = false;
    if let Some(path) = &unpacked
        && job.options.cleanup_unpacked
    {
        remove_intermediate(path);
        cleaned_up = true;
    }

    Ok(PatchSummary {
        result,
        written,
        unpacked,
        cleaned_up,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

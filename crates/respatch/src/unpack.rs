//! Unpack step: runs an external unwrapper on a protected executable.
//!
//! The tool is invoked as `<tool> <input>` from its own directory and is
//! expected to leave the unwrapped copy at `<input>.unpacked.exe`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Executable name looked up by [`detect_unpacker`]
pub const UNPACKER_EXE: &str = "Steamless.CLI.exe";
/// Subdirectory also searched by [`detect_unpacker`]
pub const UNPACKER_DIR: &str = "Steamless";
/// Marker the unpacker puts in its output file names
pub const UNPACKED_MARKER: &str = ".unpacked";
/// Suffix appended to the input path by the unpacker
pub const UNPACKED_SUFFIX: &str = ".unpacked.exe";

/// Where the unpacker writes its output for `input`.
pub fn unpacked_path(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(UNPACKED_SUFFIX);
    PathBuf::from(path)
}

/// Whether `path` already names an unpacked executable.
pub fn is_unpacked(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(UNPACKED_MARKER))
        .unwrap_or(false)
}

/// Look for the unpacker in `dir`, then in `dir/Steamless`.
pub fn detect_unpacker(dir: &Path) -> Option<PathBuf> {
    [dir.join(UNPACKER_EXE), dir.join(UNPACKER_DIR).join(UNPACKER_EXE)]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .inspect(|found| debug!("Unpacker detected at {}", found.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackOutcome {
    /// The unwrapped copy to patch instead of the input
    Unpacked(PathBuf),
    /// The tool exited cleanly but wrote nothing; patch the input as is
    NoOutput,
}

#[derive(Debug, Clone)]
pub struct Unpacker {
    tool: PathBuf,
}

impl Unpacker {
    pub fn new<P: Into<PathBuf>>(tool: P) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    fn tool_name(&self) -> String {
        self.tool.display().to_string()
    }

    fn tool_error(&self, message: impl Into<String>) -> Error {
        Error::ExternalTool {
            tool: self.tool_name(),
            message: message.into(),
        }
    }

    fn command(&self, input: &Path) -> Result<Command> {
        // Both paths must survive the change of working directory
        let tool = std::path::absolute(&self.tool)?;
        let input = std::path::absolute(input)?;

        let mut command = Command::new(&tool);
        command.arg(&input);
        if let Some(dir) = tool.parent()
            && !dir.as_os_str().is_empty()
        {
            command.current_dir(dir);
        }

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        Ok(command)
    }

    /// Run the unpacker on `input` and wait for it.
    ///
    /// Fails with [`Error::ExternalTool`] if the tool cannot be started or
    /// exits unsuccessfully.
    pub fn unpack(&self, input: &Path) -> Result<UnpackOutcome> {
        info!("Unpacking {} with {}...", input.display(), self.tool_name());

        let output = self
            .command(input)?
            .output()
            .map_err(|e| self.tool_error(format!("failed to start: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!("  [unpacker] {}", line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or_default().trim().to_string();
            let message = if detail.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, detail)
            };
            return Err(self.tool_error(message));
        }

        let expected = unpacked_path(input);
        if expected.is_file() {
            info!("Unpacked to {}", expected.display());
            Ok(UnpackOutcome::Unpacked(expected))
        } else {
            warn!(
                "Unpacker finished but {} was not created",
                expected.display()
            );
            Ok(UnpackOutcome::NoOutput)
        }
    }
}

/// Delete an intermediate file, ignoring any failure.
pub fn remove_intermediate(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed intermediate file {}", path.display()),
        Err(e) => debug!("Could not remove {}: {}", path.display(), e),
    }
}

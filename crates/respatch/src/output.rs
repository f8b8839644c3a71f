//! Output placement: where patched bytes go and how the original is kept.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::resolution::Resolution;
use crate::unpack::UNPACKED_MARKER;

/// Suffix of the backup taken before replacing the original
pub const BACKUP_SUFFIX: &str = ".bak";

/// Options controlling output placement and cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Overwrite the original file instead of writing a new one
    pub replace_in_place: bool,
    /// Copy the original to `<path>.bak` first (only used with `replace_in_place`)
    pub keep_backup: bool,
    /// Delete the intermediate unpacked file after a successful patch
    pub cleanup_unpacked: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            replace_in_place: false,
            keep_backup: false,
            cleanup_unpacked: true,
        }
    }
}

impl PatchOptions {
    pub fn builder() -> PatchOptionsBuilder {
        PatchOptionsBuilder::default()
    }

    /// Whether a backup will actually be taken.
    pub fn takes_backup(&self) -> bool {
        self.replace_in_place && self.keep_backup
    }
}

/// Builder for PatchOptions
///
/// Enabling replace-in-place turns on the backup unless it was set
/// explicitly.
#[derive(Debug, Clone, Default)]
pub struct PatchOptionsBuilder {
    replace_in_place: Option<bool>,
    keep_backup: Option<bool>,
    cleanup_unpacked: Option<bool>,
}

impl PatchOptionsBuilder {
    pub fn replace_in_place(mut self, enabled: bool) -> Self {
        self.replace_in_place = Some(enabled);
        self
    }

    pub fn keep_backup(mut self, enabled: bool) -> Self {
        self.keep_backup = Some(enabled);
        self
    }

    pub fn cleanup_unpacked(mut self, enabled: bool) -> Self {
        self.cleanup_unpacked = Some(enabled);
        self
    }

    pub fn build(self) -> PatchOptions {
        let default = PatchOptions::default();
        let replace_in_place = self.replace_in_place.unwrap_or(default.replace_in_place);
        PatchOptions {
            replace_in_place,
            keep_backup: replace_in_place && self.keep_backup.unwrap_or(true),
            cleanup_unpacked: self.cleanup_unpacked.unwrap_or(default.cleanup_unpacked),
        }
    }
}

/// `<original>.bak`
pub fn backup_path(original: &Path) -> PathBuf {
    let mut path = original.as_os_str().to_owned();
    path.push(BACKUP_SUFFIX);
    PathBuf::from(path)
}

/// Original path with `_<w>x<h>` inserted before the extension.
///
/// An unpacker marker is dropped first, so both `Game.exe` and
/// `Game.exe.unpacked.exe` map to `Game_2560x1440.exe`.
pub fn derived_output_path(original: &Path, target: Resolution) -> PathBuf {
    let file_name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_name = match file_name.find(UNPACKED_MARKER) {
        Some(pos) => &file_name[..pos],
        None => file_name.as_str(),
    };

    let base = Path::new(base_name);
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, target, ext.to_string_lossy()),
        None => format!("{}_{}", stem, target),
    };

    original.with_file_name(name)
}

pub fn output_path(original: &Path, target: Resolution, options: &PatchOptions) -> PathBuf {
    if options.replace_in_place {
        original.to_path_buf()
    } else {
        derived_output_path(original, target)
    }
}

/// Files touched by [`write_output`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub path: PathBuf,
    /// Set only when a new backup was created
    pub backup: Option<PathBuf>,
}

/// Write `patched` according to `options`.
///
/// With replace-in-place and backup enabled, `original` is copied to
/// `<original>.bak` before being overwritten. An existing backup is never
/// replaced.
pub fn write_output(
    original: &Path,
    patched: &[u8],
    target: Resolution,
    options: &PatchOptions,
) -> Result<WrittenOutput> {
    let path = output_path(original, target, options);

    let mut backup = None;
    if options.takes_backup() {
        let candidate = backup_path(original);
        if candidate.exists() {
            debug!("Backup {} already exists, keeping it", candidate.display());
        } else {
            fs::copy(original, &candidate)?;
            info!("Backed up original to {}", candidate.display());
            backup = Some(candidate);
        }
    }

    fs::write(&path, patched)?;
    info!("Wrote {} bytes to {}", patched.len(), path.display());

    Ok(WrittenOutput { path, backup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const QHD: Resolution = Resolution::new(2560, 1440);

    #[test]
    fn test_builder_replace_implies_backup() {
        let options = PatchOptions::builder().replace_in_place(true).build();
        assert!(options.keep_backup);
        assert!(options.takes_backup());

        let options = PatchOptions::builder()
            .replace_in_place(true)
            .keep_backup(false)
            .build();
        assert!(!options.takes_backup());
    }

    #[test]
    fn test_builder_backup_requires_replace() {
        let options = PatchOptions::builder().keep_backup(true).build();
        assert!(!options.replace_in_place);
        assert!(!options.keep_backup);
        assert!(options.cleanup_unpacked);
    }

    #[test]
    fn test_derived_output_path() {
        assert_eq!(
            derived_output_path(Path::new("games/Fairytale.exe"), QHD),
            PathBuf::from("games/Fairytale_2560x1440.exe")
        );
        assert_eq!(
            derived_output_path(Path::new("games/Fairytale.exe.unpacked.exe"), QHD),
            PathBuf::from("games/Fairytale_2560x1440.exe")
        );
        assert_eq!(
            derived_output_path(Path::new("Fairytale"), Resolution::new(1920, 1080)),
            PathBuf::from("Fairytale_1920x1080")
        );
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("dir/Game.exe")),
            PathBuf::from("dir/Game.exe.bak")
        );
    }

    #[test]
    fn test_write_new_file_leaves_original() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("Game.exe");
        fs::write(&original, b"original").unwrap();

        let written = write_output(&original, b"patched!", QHD, &PatchOptions::default()).unwrap();
        assert_eq!(written.path, dir.path().join("Game_2560x1440.exe"));
        assert_eq!(written.backup, None);
        assert_eq!(fs::read(&original).unwrap(), b"original");
        assert_eq!(fs::read(&written.path).unwrap(), b"patched!");
        assert!(!backup_path(&original).exists());
    }

    #[test]
    fn test_replace_with_backup() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("Game.exe");
        fs::write(&original, b"original").unwrap();

        let options = PatchOptions::builder().replace_in_place(true).build();
        let written = write_output(&original, b"patched!", QHD, &options).unwrap();
        assert_eq!(written.path, original);
        assert_eq!(written.backup, Some(backup_path(&original)));
        assert_eq!(fs::read(&original).unwrap(), b"patched!");
        assert_eq!(fs::read(backup_path(&original)).unwrap(), b"original");
    }

    #[test]
    fn test_existing_backup_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("Game.exe");
        fs::write(&original, b"second").unwrap();
        fs::write(backup_path(&original), b"first").unwrap();

        let options = PatchOptions::builder().replace_in_place(true).build();
        let written = write_output(&original, b"third!", QHD, &options).unwrap();
        assert_eq!(written.backup, None);
        assert_eq!(fs::read(backup_path(&original)).unwrap(), b"first");
        assert_eq!(fs::read(&original).unwrap(), b"third!");
    }

    #[test]
    fn test_replace_without_backup() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("Game.exe");
        fs::write(&original, b"original").unwrap();

        let options = PatchOptions::builder()
            .replace_in_place(true)
            .keep_backup(false)
            .build();
        write_output(&original, b"patched!", QHD, &options).unwrap();
        assert!(!backup_path(&original).exists());
    }
}

//! File-backed store for [`GovernorSettings`].
//!
//! The store is the sole writer of its document and always overwrites it
//! whole. Fields added to the file by hand are therefore dropped on the next
//! save.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::GovernorError;
use crate::settings::{GovernorPatch, GovernorSettings};

/// Reads and writes the governor settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, or the default document if the file is missing or
    /// cannot be parsed. Never fails.
    pub fn load(&self) -> GovernorSettings {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "No governor settings at {}, using defaults",
                    self.path.display()
                );
                return GovernorSettings::default();
            }
            Err(e) => {
                warn!(
                    "Failed to read {}: {e}, using defaults",
                    self.path.display()
                );
                return GovernorSettings::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Failed to parse {}: {e}, using defaults",
                    self.path.display()
                );
                GovernorSettings::default()
            }
        }
    }

    /// Stamp `updatedAt` and write the whole document.
    ///
    /// Written to a temp file first, then renamed over the target.
    pub fn save(&self, settings: &mut GovernorSettings) -> Result<(), GovernorError> {
        settings.updated_at = Utc::now();
        let data = serde_json::to_string_pretty(settings).map_err(|e| self.write_error(e))?;
        write_atomically(&self.path, &data).map_err(|e| self.write_error(e))?;
        debug!(
            "Saved governor settings to {} (mode={:?}, level={})",
            self.path.display(),
            settings.mode,
            settings.current_level
        );
        Ok(())
    }

    fn write_error(&self, e: impl std::fmt::Display) -> GovernorError {
        GovernorError::StoreWrite {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

/// Merge `patch` into `current` and return the result.
///
/// See [`GovernorSettings::apply`] for the merge rules.
pub fn apply_partial_update(mut current: GovernorSettings, patch: GovernorPatch) -> GovernorSettings {
    current.apply(patch);
    current
}

/// Write `data` to `path` via a sibling temp file and rename, creating the
/// parent directory if needed.
///
/// An existing file keeps its permissions, and a symlink is written through
/// to its target instead of being replaced. The temp file is removed if any
/// step fails.
pub(crate) fn write_atomically(path: &Path, data: &str) -> std::io::Result<()> {
    let (target, permissions) = match std::fs::canonicalize(path) {
        Ok(real) => {
            let permissions = std::fs::metadata(&real)?.permissions();
            (real, Some(permissions))
        }
        Err(_) => (path.to_path_buf(), None),
    };
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = target.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = target.with_file_name(tmp_name);

    let result = write_and_rename(&tmp_path, &target, data, permissions);
    if result.is_err()
        && tmp_path.exists()
        && let Err(e) = std::fs::remove_file(&tmp_path)
    {
        warn!("Failed to remove {}: {e}", tmp_path.display());
    }
    result
}

fn write_and_rename(
    tmp_path: &Path,
    target: &Path,
    data: &str,
    permissions: Option<std::fs::Permissions>,
) -> std::io::Result<()> {
    let mut file = std::fs::File::create(tmp_path)?;
    // Restrict the temp file before any data lands in it.
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.write_all(data.as_bytes())?;
    drop(file);
    std::fs::rename(tmp_path, target)
}

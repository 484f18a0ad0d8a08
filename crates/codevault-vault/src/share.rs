// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key share files: naming, reading, and the staged commit of a full set.
//!
//! Each share is one file in the vault directory holding the base64 text of
//! `nonce ‖ AES-256-GCM(master_key)`. Shares are addressed by fixed indices
//! `0..SHARE_COUNT`, substituted into the configured filename template.
//!
//! A set of shares is committed in two phases: every file is first written
//! and fsynced as a temp file inside the vault directory, and only when all
//! of them are staged are they renamed over their targets. A crash can
//! therefore never leave a half-written share behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use codevault_core::{check_share_pattern, VaultError, INDEX_PLACEHOLDER, SHARE_COUNT};
use tracing::{debug, warn};

const STAGING_PREFIX: &str = ".share-";
const STAGING_SUFFIX: &str = ".tmp";

/// The vault directory plus the filename template for its share files.
#[derive(Debug, Clone)]
pub struct ShareLayout {
    directory: PathBuf,
    pattern: String,
}

impl ShareLayout {
    /// Validate the template: exactly one `{}` slot and no path separators.
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Result<Self, VaultError> {
        let pattern = pattern.into();
        check_share_pattern(&pattern)
            .map_err(|problem| VaultError::Config(format!("share file template {problem}")))?;
        Ok(Self {
            directory: directory.into(),
            pattern,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the share file for `index`.
    pub fn path(&self, index: usize) -> PathBuf {
        self.directory
            .join(self.pattern.replacen(INDEX_PLACEHOLDER, &index.to_string(), 1))
    }

    /// Indices whose share file currently exists.
    pub fn existing(&self) -> Vec<usize> {
        (0..SHARE_COUNT)
            .filter(|&index| self.path(index).is_file())
            .collect()
    }

    /// Read the text of share `index`, or `None` if the file does not exist.
    pub fn read(&self, index: usize) -> Result<Option<String>, VaultError> {
        let path = self.path(index);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::io(
                format!("failed to read share {}", path.display()),
                e,
            )),
        }
    }

    /// Replace shares `0..contents.len()` with `contents`, all or nothing as
    /// far as the filesystem allows.
    ///
    /// Creates the vault directory if absent. A failure while staging leaves
    /// every existing share untouched. A rename failure after at least one
    /// share was replaced is reported as [`VaultError::PartialCommit`].
    pub fn commit(&self, contents: &[String]) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            VaultError::io(
                format!("failed to create vault directory {}", self.directory.display()),
                e,
            )
        })?;

        let mut staged = Vec::with_capacity(contents.len());
        for (index, text) in contents.iter().enumerate() {
            staged.push((index, self.stage(index, text)?));
        }

        let total = staged.len();
        for (committed, (index, file)) in staged.into_iter().enumerate() {
            let target = self.path(index);
            if let Err(e) = file.persist(&target) {
                if committed == 0 {
                    return Err(VaultError::io(
                        format!("failed to replace share {}", target.display()),
                        e.error,
                    ));
                }
                warn!(committed, total, path = %target.display(), "share commit interrupted");
                return Err(VaultError::PartialCommit {
                    committed,
                    total,
                    source: e.error,
                });
            }
            debug!(index, path = %target.display(), "share committed");
        }

        sync_directory(&self.directory);
        Ok(())
    }

    /// Delete every share file currently present.
    ///
    /// Only used to undo an enrollment that failed part way, when the vault
    /// held no shares before the commit.
    pub fn discard(&self) -> Result<(), VaultError> {
        for index in self.existing() {
            let path = self.path(index);
            std::fs::remove_file(&path).map_err(|e| {
                VaultError::io(format!("failed to remove share {}", path.display()), e)
            })?;
            debug!(index, path = %path.display(), "share removed");
        }
        sync_directory(&self.directory);
        Ok(())
    }

    /// Write one share to an fsynced temp file beside its target.
    ///
    /// The temp file is created with mode 0600 and is deleted on drop unless
    /// persisted.
    fn stage(&self, index: usize, text: &str) -> Result<tempfile::NamedTempFile, VaultError> {
        let context = || format!("failed to stage share {index} in {}", self.directory.display());

        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.directory)
            .map_err(|e| VaultError::io(context(), e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| VaultError::io(context(), e))?;
        file.as_file()
            .sync_all()
            .map_err(|e| VaultError::io(context(), e))?;

        Ok(file)
    }
}

/// Flush directory metadata so the renames survive a crash. Best effort.
#[cfg(unix)]
fn sync_directory(directory: &Path) {
    if let Err(e) = std::fs::File::open(directory).and_then(|dir| dir.sync_all()) {
        warn!(directory = %directory.display(), error = %e, "failed to sync vault directory");
    }
}

#[cfg(not(unix))]
fn sync_directory(_directory: &Path) {}

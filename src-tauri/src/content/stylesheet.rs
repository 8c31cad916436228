//! Loading the user stylesheet from disk.
//!
//! Stateless apart from its creation policy. Nothing is cached: every
//! injection re-reads the file, so edits are picked up on the next page load
//! or toggle.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::notice::Notice;

/// File looked up inside the configured directory.
pub const STYLESHEET_FILE_NAME: &str = "custom.css";

/// Why no stylesheet content is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StylesheetError {
    #[error("Created the stylesheet directory. Place your stylesheet at {}", .path.display())]
    DirectoryCreatedAwaitingFile { path: PathBuf },

    #[error("Could not create stylesheet directory {}: {detail}", .directory.display())]
    DirectoryCreateFailed { directory: PathBuf, detail: String },

    #[error("Stylesheet not found. Expected file: {}", .path.display())]
    FileMissing { path: PathBuf },

    #[error("Stylesheet is empty: {}", .path.display())]
    EmptyContent { path: PathBuf },

    #[error("Could not read stylesheet {}: {detail}", .path.display())]
    ReadFailed { path: PathBuf, detail: String },
}

impl StylesheetError {
    /// Notice shown for this condition. Creation failures are errors; the
    /// rest are configuration warnings.
    pub fn notice(&self) -> Notice {
        match self {
            StylesheetError::DirectoryCreateFailed { .. } => {
                Notice::error("Custom Stylesheet", self.to_string())
            },
            _ => Notice::warning("Custom Stylesheet", self.to_string()),
        }
    }
}

/// Path of the stylesheet inside `directory`.
pub fn stylesheet_path(directory: &Path) -> PathBuf {
    directory.join(STYLESHEET_FILE_NAME)
}

/// Reads the stylesheet. A missing directory is created owner-only and
/// reported, never treated as a silent success.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetLoader;

impl StylesheetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read `<directory>/custom.css`, returning its text untransformed.
    pub fn load(&self, directory: &Path) -> Result<String, StylesheetError> {
        let path = stylesheet_path(directory);

        if !directory.is_dir() {
            return match create_private_dir(directory) {
                Ok(()) => {
                    log::info!(
                        "[STYLESHEET] Created directory {}",
                        directory.display()
                    );
                    Err(StylesheetError::DirectoryCreatedAwaitingFile { path })
                },
                Err(e) => Err(StylesheetError::DirectoryCreateFailed {
                    directory: directory.to_path_buf(),
                    detail: e.to_string(),
                }),
            };
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StylesheetError::FileMissing { path });
            },
            Err(e) => {
                return Err(StylesheetError::ReadFailed {
                    path,
                    detail: e.to_string(),
                });
            },
        };

        if content.trim().is_empty() {
            return Err(StylesheetError::EmptyContent { path });
        }

        log::debug!(
            "[STYLESHEET] Loaded {} bytes from {}",
            content.len(),
            path.display()
        );
        Ok(content)
    }
}

#[cfg(unix)]
fn create_private_dir(directory: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(directory)
}

#[cfg(not(unix))]
fn create_private_dir(directory: &Path) -> std::io::Result<()> {
    fs::DirBuilder::new().recursive(true).create(directory)
}

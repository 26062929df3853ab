//! File operation utilities
//!
//! Name sanitization for titles coming off the web, output directory
//! creation, and the temp-file-then-rename discipline used for archives.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::downloader::core::{DownloadError, FileOperation, Result};

const WINDOWS_FORBIDDEN: &[char] = &['/', '>', '<', ':', '"', '\\', '|', '?', '*', ' '];
const LINUX_FORBIDDEN: &[char] = &['/', ' '];
const MACOS_FORBIDDEN: &[char] = &['/', ':', ' '];
const DEFAULT_FORBIDDEN: &[char] = &['/', ' '];

/// Characters that may not appear in a file name on `os`
///
/// `os` uses the values of [`std::env::consts::OS`].
pub fn forbidden_chars_for(os: &str) -> &'static [char] {
    match os {
        "windows" => WINDOWS_FORBIDDEN,
        "linux" => LINUX_FORBIDDEN,
        "macos" => MACOS_FORBIDDEN,
        _ => DEFAULT_FORBIDDEN,
    }
}

/// Make `name` safe to use as a file or directory name on this platform
pub fn sanitize(name: &str) -> String {
    sanitize_with(name, forbidden_chars_for(std::env::consts::OS))
}

/// Trim `name` and replace every character of `forbidden` with `_`
pub fn sanitize_with(name: &str, forbidden: &[char]) -> String {
    name.trim()
        .chars()
        .map(|c| if forbidden.contains(&c) { '_' } else { c })
        .collect()
}

/// Create `path` (and parents) unless it already exists
///
/// An existing directory is reused as is; its contents are left untouched.
pub async fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| DownloadError::FileSystem {
        path: path.to_path_buf(),
        operation: FileOperation::CreateDir,
        source: e,
    })?;
    debug!("Using output directory {}", path.display());
    Ok(())
}

/// Create a temporary file path for an archive that is still being written
pub fn create_temp_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest_path.with_file_name(name)
}

/// Atomically rename a temporary file to its final destination
///
/// The archive either exists completely or not at all.
pub async fn atomic_rename(temp_path: &Path, dest_path: &Path) -> Result<()> {
    fs::rename(temp_path, dest_path).await.map_err(|e| DownloadError::FileSystem {
        path: dest_path.to_path_buf(),
        operation: FileOperation::Move,
        source: e,
    })?;
    debug!("Atomically renamed {} to {}", temp_path.display(), dest_path.display());
    Ok(())
}

/// Best-effort removal of a leftover temp file
pub async fn discard_temp(temp_path: &Path) {
    match fs::remove_file(temp_path).await {
        Ok(()) => debug!("Removed partial file {}", temp_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            let error = DownloadError::FileSystem {
                path: temp_path.to_path_buf(),
                operation: FileOperation::Delete,
                source: e,
            };
            tracing::warn!("{}", error);
        }
    }
}

//! Chapter archive writing
//!
//! A chapter becomes one zip file with one entry per page. Entries are named
//! by the page's position in reading order (`0000.jpg`, `0001.jpg`, ...),
//! never by the order in which downloads finished.

use std::io::Write;
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;

use crate::downloader::core::files::{atomic_rename, create_temp_path, discard_temp};
use crate::downloader::core::{DownloadError, FileOperation, PageImage, Result};

/// Entry name for the page at `position`, keeping the image's extension
pub fn page_entry_name(position: usize, image_url: &str) -> String {
    format!("{:04}{}", position, image_extension(image_url))
}

/// Extension of the last path segment of `image_url`, dot included
fn image_extension(image_url: &str) -> String {
    let path = match url::Url::parse(image_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => image_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let basename = path.rsplit('/').next().unwrap_or_default();
    Path::new(basename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Write `pages` into a zip archive at `dest`
///
/// The archive is written to a `.part` sibling and only renamed into place
/// once it is complete; on any failure the partial file is removed and
/// nothing appears at `dest`. An existing archive at `dest` is replaced.
pub async fn write_chapter_archive(dest: &Path, mut pages: Vec<PageImage>) -> Result<()> {
    pages.sort_by_key(|page| page.position);

    let temp_path = create_temp_path(dest);
    let task_path = temp_path.clone();
    let written = tokio::task::spawn_blocking(move || write_zip(&task_path, &pages))
        .await
        .map_err(|e| DownloadError::TaskFailed {
            reason: format!("archive writer for '{}': {}", dest.display(), e),
        })
        .and_then(|result| result);

    let committed = match written {
        Ok(()) => atomic_rename(&temp_path, dest).await,
        Err(e) => Err(e),
    };
    if committed.is_err() {
        discard_temp(&temp_path).await;
    }
    committed
}

fn write_zip(path: &Path, pages: &[PageImage]) -> Result<()> {
    let write_error = |source: std::io::Error| DownloadError::FileSystem {
        path: path.to_path_buf(),
        operation: FileOperation::Write,
        source,
    };
    let archive_error = |source: zip::result::ZipError| DownloadError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(write_error)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for page in pages {
        let name = page_entry_name(page.position, &page.url);
        zip.start_file(name.as_str(), options).map_err(archive_error)?;
        zip.write_all(&page.bytes).map_err(write_error)?;
    }

    let file = zip.finish().map_err(archive_error)?;
    file.sync_all().map_err(write_error)?;
    debug!("Wrote {} page(s) to {}", pages.len(), path.display());
    Ok(())
}

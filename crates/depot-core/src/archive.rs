//! Archive building for bulk downloads
//!
//! An archive bundles every file of one extension class under a root into a
//! single tar stream. The scan collects root-relative paths first (the
//! manifest), then the tar is written entry by entry over that manifest, so
//! entry names are always root-relative and no filename is ever handed to a
//! shell.

use crate::route::has_extension;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

/// Errors from building an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive root itself is missing or not a directory
    #[error("archive root is not a directory: {0}")]
    BadRoot(PathBuf),

    /// IO error while scanning or writing the archive
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished archive spooled to a temporary file. The spool is deleted
/// when the value is dropped, on success and failure paths alike.
pub struct ArchiveSpool {
    spool: NamedTempFile,
    size: u64,
    entries: usize,
    skipped: usize,
}

impl ArchiveSpool {
    /// Total archive size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of files bundled into the archive.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Number of directory entries that could not be read during the scan.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Opens an independent read handle positioned at the start.
    pub fn open(&self) -> std::io::Result<std::fs::File> {
        self.spool.reopen()
    }
}

/// Walks `root` recursively, collecting every regular file whose extension
/// matches `ext` (case-insensitive, hidden entries excluded), and bundles
/// them into a tar spool with root-relative entry names. An empty manifest
/// yields a valid empty archive. Unreadable subtrees are skipped and
/// counted, not fatal; only a bad root is.
pub fn build_tar(root: &Path, ext: &str) -> Result<ArchiveSpool, ArchiveError> {
    if !root.is_dir() {
        return Err(ArchiveError::BadRoot(root.to_path_buf()));
    }

    let mut manifest: Vec<PathBuf> = Vec::new();
    let mut skipped = 0usize;
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !has_extension(&name, ext) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            manifest.push(rel.to_path_buf());
        }
    }
    if skipped > 0 {
        warn!(skipped, root = %root.display(), "skipped unreadable entries during archive scan");
    }

    let mut spool = NamedTempFile::new()?;
    {
        let mut builder = tar::Builder::new(&mut spool);
        for rel in &manifest {
            builder.append_path_with_name(root.join(rel), rel)?;
        }
        builder.finish()?;
    }
    spool.flush()?;
    let size = spool.as_file().metadata()?.len();

    Ok(ArchiveSpool { spool, size, entries: manifest.len(), skipped })
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

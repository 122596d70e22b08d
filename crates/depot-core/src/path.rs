//! Client path sanitizing
//!
//! Client-supplied paths are normalized into root-relative segment lists
//! before anything touches the filesystem. A parent-traversal segment
//! anywhere in the path is rejected outright.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from normalizing a client-supplied path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path contains a parent-traversal segment
    #[error("path contains a parent-traversal segment")]
    Traversal,

    /// Path is missing the filename component required in this context
    #[error("path has no filename component")]
    MissingName,

    /// Filename contains a separator or is itself a traversal segment
    #[error("invalid filename: {0}")]
    BadName(String),
}

/// A normalized path inside a storage root: destination directory segments
/// plus, in the file form, a leaf filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    dest: Vec<String>,
    name: Option<String>,
}

impl VirtualPath {
    /// Normalizes a destination-directory path. An empty remainder denotes
    /// the root itself.
    pub fn dir(raw: &str) -> Result<Self, PathError> {
        Ok(Self { dest: split_segments(raw)?, name: None })
    }

    /// Normalizes a file path into destination directory + filename.
    ///
    /// The leaf requires at least one directory segment ahead of it, so
    /// bare names and root-level names are rejected.
    pub fn file(raw: &str) -> Result<Self, PathError> {
        let mut segments = split_segments(raw)?;
        if segments.len() < 2 {
            return Err(PathError::MissingName);
        }
        let name = segments.pop();
        Ok(Self { dest: segments, name })
    }

    /// Strips a leading root-alias token (`alias` alone, or `alias/rest`),
    /// leaving a root-relative path. Paths not starting with the alias are
    /// returned unchanged.
    pub fn strip_alias<'a>(raw: &'a str, alias: &str) -> &'a str {
        match raw.strip_prefix(alias) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => raw,
        }
    }

    /// Destination directory segments, root-relative.
    pub fn dest_segments(&self) -> &[String] {
        &self.dest
    }

    /// Leaf filename, present only in the file form.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Destination directory resolved under `root`.
    pub fn dest_dir(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        for segment in &self.dest {
            dir.push(segment);
        }
        dir
    }

    /// Full path resolved under `root` (destination plus filename, if any).
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut path = self.dest_dir(root);
        if let Some(name) = &self.name {
            path.push(name);
        }
        path
    }

    /// Destination directory re-serialized for the store protocol. The root
    /// itself travels as `/` so the field is never empty on the wire.
    pub fn wire_dest(&self) -> String {
        if self.dest.is_empty() {
            "/".to_string()
        } else {
            self.dest.join("/")
        }
    }
}

/// Validates a bare filename field: no separators, no traversal, non-empty.
pub fn safe_file_name(name: &str) -> Result<&str, PathError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(PathError::BadName(name.to_string()));
    }
    Ok(name)
}

fn split_segments(raw: &str) -> Result<Vec<String>, PathError> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(PathError::Traversal),
            other => segments.push(other.to_string()),
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_stripping() {
        assert_eq!(VirtualPath::strip_alias("~depot/x/a.c", "~depot"), "/x/a.c");
        assert_eq!(VirtualPath::strip_alias("~depot", "~depot"), "/");
        assert_eq!(VirtualPath::strip_alias("/x/a.c", "~depot"), "/x/a.c");
        // An alias-prefixed word that is not the alias token stays intact.
        assert_eq!(VirtualPath::strip_alias("~depotx/a.c", "~depot"), "~depotx/a.c");
    }

    #[test]
    fn dir_normalization() {
        let p = VirtualPath::dir("/x//y/./z/").unwrap();
        assert_eq!(p.dest_segments(), ["x", "y", "z"]);
        assert_eq!(p.wire_dest(), "x/y/z");

        let root = VirtualPath::dir("/").unwrap();
        assert!(root.dest_segments().is_empty());
        assert_eq!(root.wire_dest(), "/");
    }

    #[test]
    fn traversal_is_rejected_everywhere() {
        assert_eq!(VirtualPath::dir("/x/../y"), Err(PathError::Traversal));
        assert_eq!(VirtualPath::dir(".."), Err(PathError::Traversal));
        assert_eq!(VirtualPath::file("/x/../a.c"), Err(PathError::Traversal));
    }

    #[test]
    fn file_form_requires_a_parent_directory() {
        let p = VirtualPath::file("/x/y/report.pdf").unwrap();
        assert_eq!(p.dest_segments(), ["x", "y"]);
        assert_eq!(p.name(), Some("report.pdf"));

        assert_eq!(VirtualPath::file("report.pdf"), Err(PathError::MissingName));
        assert_eq!(VirtualPath::file("/report.pdf"), Err(PathError::MissingName));
    }

    #[test]
    fn resolve_under_root() {
        let p = VirtualPath::file("/x/a.txt").unwrap();
        let root = Path::new("/srv/depot");
        assert_eq!(p.dest_dir(root), Path::new("/srv/depot/x"));
        assert_eq!(p.resolve(root), Path::new("/srv/depot/x/a.txt"));
    }

    #[test]
    fn file_name_validation() {
        assert_eq!(safe_file_name("a.c").unwrap(), "a.c");
        assert!(safe_file_name("..").is_err());
        assert!(safe_file_name("a/b.c").is_err());
        assert!(safe_file_name("").is_err());
    }
}

//! Directory listings filtered by extension class

use crate::route::has_extension;
use std::io;
use std::path::Path;

/// Lists the names of regular files directly under `dir` whose extension
/// matches `ext` (case-insensitive), lexicographically sorted. Hidden
/// entries are skipped. A missing directory yields an empty list, not an
/// error.
pub fn list_names_by_ext(dir: &Path, ext: &str) -> io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if name.starts_with('.') {
            continue;
        }
        if has_extension(&name, ext) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_matching_names_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt", "UPPER.PDF", ".hidden.pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names = list_names_by_ext(dir.path(), "pdf").unwrap();
        assert_eq!(names, ["UPPER.PDF", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let names = list_names_by_ext(&dir.path().join("nope"), "pdf").unwrap();
        assert!(names.is_empty());
    }
}

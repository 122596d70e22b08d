//! Extension routing
//!
//! Every operation that needs to know where a file lives (upload
//! relocation, download, remove, archive) consults the same pure mapping
//! from filename extension to routing target, so the decision can never
//! diverge between operations.

/// Where a filename's extension class places it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Kept under the gateway's own root
    Local,
    /// Owned by the backend store at this configuration index
    Store(usize),
    /// No routing target for this extension (including missing extensions)
    Unsupported,
}

/// The closed extension-to-target mapping: one local class plus one class
/// per configured backend store, in configuration order.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    local_ext: String,
    store_exts: Vec<String>,
}

impl RoutingTable {
    pub fn new(local_ext: &str, store_exts: impl IntoIterator<Item = String>) -> Self {
        Self {
            local_ext: normalize_ext(local_ext),
            store_exts: store_exts.into_iter().map(|e| normalize_ext(&e)).collect(),
        }
    }

    /// Classifies a filename by its final extension, case-insensitively.
    pub fn classify(&self, filename: &str) -> RouteTarget {
        match file_extension(filename) {
            Some(ext) => self.class_for_ext(ext),
            None => RouteTarget::Unsupported,
        }
    }

    /// Classifies a bare extension token. A leading dot is accepted, so the
    /// wire form `.pdf` and the configured form `pdf` agree.
    pub fn class_for_ext(&self, ext: &str) -> RouteTarget {
        let ext = normalize_ext(ext);
        if ext.is_empty() {
            return RouteTarget::Unsupported;
        }
        if ext == self.local_ext {
            return RouteTarget::Local;
        }
        match self.store_exts.iter().position(|e| *e == ext) {
            Some(idx) => RouteTarget::Store(idx),
            None => RouteTarget::Unsupported,
        }
    }

    /// The extension class kept local.
    pub fn local_ext(&self) -> &str {
        &self.local_ext
    }
}

/// The text after the last `.` of a filename, or `None` when there is no
/// extension. A leading dot alone (`.bashrc`) does not count as one.
pub fn file_extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Returns whether `filename` carries extension `ext`, case-insensitively.
/// `ext` may be given with or without its leading dot.
pub fn has_extension(filename: &str, ext: &str) -> bool {
    match file_extension(filename) {
        Some(found) => found.eq_ignore_ascii_case(ext.trim_start_matches('.')),
        None => false,
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RoutingTable {
        RoutingTable::new("c", ["pdf".to_string(), "txt".to_string(), "zip".to_string()])
    }

    #[test]
    fn classify_by_extension() {
        let t = table();
        assert_eq!(t.classify("main.c"), RouteTarget::Local);
        assert_eq!(t.classify("report.pdf"), RouteTarget::Store(0));
        assert_eq!(t.classify("notes.txt"), RouteTarget::Store(1));
        assert_eq!(t.classify("bundle.zip"), RouteTarget::Store(2));
        assert_eq!(t.classify("image.png"), RouteTarget::Unsupported);
    }

    #[test]
    fn classify_is_case_insensitive() {
        let t = table();
        assert_eq!(t.classify("REPORT.PDF"), RouteTarget::Store(0));
        assert_eq!(t.classify("Main.C"), RouteTarget::Local);
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let t = table();
        assert_eq!(t.classify("README"), RouteTarget::Unsupported);
        assert_eq!(t.classify(".bashrc"), RouteTarget::Unsupported);
        assert_eq!(t.classify("trailing."), RouteTarget::Unsupported);
    }

    #[test]
    fn ext_tokens_accept_a_leading_dot() {
        let t = table();
        assert_eq!(t.class_for_ext(".pdf"), RouteTarget::Store(0));
        assert_eq!(t.class_for_ext("c"), RouteTarget::Local);
        assert_eq!(t.class_for_ext(".zz"), RouteTarget::Unsupported);
        assert_eq!(t.class_for_ext("."), RouteTarget::Unsupported);
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("a.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert!(has_extension("A.PDF", ".pdf"));
        assert!(!has_extension("README", "pdf"));
    }
}

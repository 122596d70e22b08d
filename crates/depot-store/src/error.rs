//! Error types for the depot-store crate

use depot_core::{ArchiveError, PathError};
use depot_proto::ProtoError;
use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from serving or speaking the store protocol
#[derive(Error, Debug)]
pub enum StoreError {
    /// Destination or filename failed sanitization
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Stored file does not exist
    #[error("file not found: {0}")]
    NotFound(String),

    /// Requested extension is not the one this store serves
    #[error("extension {requested} not served by this store (serves .{serves})")]
    WrongExtension { requested: String, serves: String },

    /// Destination directory could not be created
    #[error("cannot create destination directory: {0}")]
    CreateDir(#[source] std::io::Error),

    /// Store could not be reached (client side)
    #[error("store unreachable at {addr}: {source}")]
    Unreachable { addr: String, source: std::io::Error },

    /// Protocol-level failure: truncated body, malformed line, `ERR` reply
    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),

    /// Archive build failure
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Short reason token used in wire `ERR` replies.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Path(_) => "badpath",
            Self::NotFound(_) => "nofile",
            Self::WrongExtension { .. } => "ext",
            Self::CreateDir(_) => "makedir",
            Self::Unreachable { .. } => "connect",
            Self::Proto(_) => "stream",
            Self::Archive(_) => "tar",
            Self::Io(_) => "disk",
        }
    }
}

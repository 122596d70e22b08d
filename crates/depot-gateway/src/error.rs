//! Error types for the depot-gateway crate

use depot_core::{ArchiveError, PathError};
use depot_proto::ProtoError;
use depot_store::StoreError;
use thiserror::Error;

/// Result type alias using `GatewayError`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors raised while serving gateway connections
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Client path failed sanitization
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Extension has no routing target
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// Local file does not exist
    #[error("file not found: {0}")]
    NotFound(String),

    /// Backend store failure: unreachable, rejected, or mid-relay
    #[error("backend store error: {0}")]
    Store(#[from] StoreError),

    /// Archive build failure
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Protocol-level failure: malformed sub-line, truncated body
    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

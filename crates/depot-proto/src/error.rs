//! Error types for the depot-proto crate

use thiserror::Error;

/// Result type alias using `ProtoError`
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors that can occur while speaking the wire protocol
#[derive(Error, Debug)]
pub enum ProtoError {
    /// Command line did not match the grammar; the payload is the short
    /// reason token echoed back on the wire (`bad UPLOAD`, `unknown`, ...)
    #[error("malformed command: {0}")]
    Malformed(String),

    /// A protocol line exceeded the line-length bound
    #[error("line exceeds {max} bytes")]
    LineTooLong { max: usize },

    /// The peer closed the connection where a line was required
    #[error("connection closed by peer")]
    Closed,

    /// A framed body ended before its declared length
    #[error("stream truncated: expected {expected} bytes, got {got}")]
    StreamTruncated { expected: u64, got: u64 },

    /// The peer answered a request with an `ERR` reply
    #[error("peer replied with error: {0}")]
    ErrReply(String),

    /// A reply line that is neither `OK` nor `ERR`
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the depot-client crate

use depot_proto::ProtoError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ClientError`
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from talking to the gateway
#[derive(Error, Debug)]
pub enum ClientError {
    /// Gateway could not be reached
    #[error("cannot connect to gateway at {addr}: {source}")]
    Connect { addr: String, source: std::io::Error },

    /// Batch outside the protocol's per-command bounds
    #[error("batch must contain between 1 and {max} entries, got {got}")]
    BatchSize { got: usize, max: usize },

    /// A source file could not be read or has no usable name
    #[error("unusable source file {path}: {reason}")]
    BadSource { path: PathBuf, reason: String },

    /// The gateway answered with an `ERR` reply
    #[error("gateway replied with error: {0}")]
    Server(String),

    /// A reply line outside the protocol grammar
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// Protocol-level failure
    #[error("protocol error: {0}")]
    Proto(ProtoError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtoError> for ClientError {
    fn from(err: ProtoError) -> Self {
        match err {
            ProtoError::ErrReply(reason) => ClientError::Server(reason),
            other => ClientError::Proto(other),
        }
    }
}

//! Per-command gateway handlers
//!
//! Each handler owns one client-facing command. Per-file errors inside a
//! batch are reported inline and processing continues; failures that leave
//! the stream unparseable send an `ERR` line and return the error so the
//! connection loop tears the session down.

pub mod archive;
pub mod download;
pub mod listing;
pub mod remove;
pub mod upload;

use crate::Result;
use depot_proto::line::{read_line_opt, write_line};
use depot_proto::ProtoError;
use tokio::io::{AsyncBufRead, AsyncWrite};

/// Reads one `<KEYWORD> <value>` sub-line mid-batch and returns the value
/// token. Any shape failure here is fatal to the connection: the matching
/// `ERR` reason is sent before the error is returned.
pub(crate) async fn read_field<R, W>(reader: &mut R, writer: &mut W, keyword: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let tag = keyword.to_ascii_lowercase();
    let line = match read_line_opt(reader).await? {
        Some(line) => line,
        None => {
            write_line(writer, &format!("ERR {tag}")).await?;
            return Err(ProtoError::Closed.into());
        }
    };
    let prefix = format!("{keyword} ");
    let Some(rest) = line.strip_prefix(&prefix) else {
        write_line(writer, &format!("ERR {tag}hdr")).await?;
        return Err(ProtoError::Malformed(format!("{tag}hdr")).into());
    };
    match rest.split_whitespace().next() {
        Some(value) => Ok(value.to_string()),
        None => {
            write_line(writer, &format!("ERR {tag}parse")).await?;
            Err(ProtoError::Malformed(format!("{tag}parse")).into())
        }
    }
}

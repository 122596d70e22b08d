//! Line-oriented command grammar and line I/O
//!
//! Commands travel as single lines of space-separated fields terminated by
//! `\n`. Replies are `OK [payload]` or `ERR <reason>`; some replies are
//! followed by further `NAME <n>` lines or a framed body.

use crate::{ProtoError, Result};
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single protocol line.
pub const MAX_LINE: usize = 4096;

/// Reads one line, stripping the terminator. EOF before any byte is
/// [`ProtoError::Closed`]; use [`read_line_opt`] where EOF is a clean end.
pub async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    read_line_opt(reader).await?.ok_or(ProtoError::Closed)
}

/// Reads one line, returning `None` on a clean EOF before any byte.
pub async fn read_line_opt<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    if n > MAX_LINE {
        return Err(ProtoError::LineTooLong { max: MAX_LINE });
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Writes one terminated line and flushes it onto the wire.
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Splits a reply line into its `OK` payload.
///
/// `OK` yields an empty payload, `OK <rest>` yields `<rest>`, `ERR <reason>`
/// becomes [`ProtoError::ErrReply`], anything else is
/// [`ProtoError::UnexpectedReply`].
pub fn ok_payload(line: &str) -> Result<&str> {
    if line == "OK" {
        return Ok("");
    }
    if let Some(rest) = line.strip_prefix("OK ") {
        return Ok(rest);
    }
    if line == "ERR" {
        return Err(ProtoError::ErrReply(String::new()));
    }
    if let Some(reason) = line.strip_prefix("ERR ") {
        return Err(ProtoError::ErrReply(reason.to_string()));
    }
    Err(ProtoError::UnexpectedReply(line.to_string()))
}

/// Commands accepted by the gateway from end clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCommand {
    /// `UPLOAD <n> <dest>` followed by `n` (`NAME`, `SIZE`, body) triples
    Upload { count: usize, dest: String },
    /// `DOWNLF <n>` followed by `n` `PATH` lines
    Download { count: usize },
    /// `REMOVEF <n>` followed by `n` `PATH` lines
    Remove { count: usize },
    /// `DOWNLTAR <ext>`
    DownloadTar { ext: String },
    /// `DISPFNAMES <path>`
    ListNames { path: String },
    /// `QUIT`
    Quit,
}

impl GatewayCommand {
    /// Maximum files per `UPLOAD` batch.
    pub const MAX_UPLOAD: usize = 3;
    /// Maximum requests per `DOWNLF`/`REMOVEF` batch.
    pub const MAX_BATCH: usize = 2;

    /// Parses one gateway command line. The error payload is the reason
    /// token the server echoes in its `ERR` reply.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        let verb = fields.next().unwrap_or("");
        match verb {
            "UPLOAD" => {
                let count = parse_count(fields.next(), 1..=Self::MAX_UPLOAD)
                    .ok_or_else(|| ProtoError::Malformed("bad UPLOAD".into()))?;
                let dest = fields
                    .next()
                    .ok_or_else(|| ProtoError::Malformed("bad UPLOAD".into()))?;
                Ok(Self::Upload { count, dest: dest.to_string() })
            }
            "DOWNLF" => {
                let count = parse_count(fields.next(), 1..=Self::MAX_BATCH)
                    .ok_or_else(|| ProtoError::Malformed("bad DOWNLF".into()))?;
                Ok(Self::Download { count })
            }
            "REMOVEF" => {
                let count = parse_count(fields.next(), 1..=Self::MAX_BATCH)
                    .ok_or_else(|| ProtoError::Malformed("bad REMOVEF".into()))?;
                Ok(Self::Remove { count })
            }
            "DOWNLTAR" => {
                let ext = fields
                    .next()
                    .ok_or_else(|| ProtoError::Malformed("bad DOWNLTAR".into()))?;
                Ok(Self::DownloadTar { ext: ext.to_string() })
            }
            "DISPFNAMES" => {
                let path = fields
                    .next()
                    .ok_or_else(|| ProtoError::Malformed("bad DISPFNAMES".into()))?;
                Ok(Self::ListNames { path: path.to_string() })
            }
            "QUIT" => Ok(Self::Quit),
            _ => Err(ProtoError::Malformed("unknown".into())),
        }
    }
}

impl fmt::Display for GatewayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload { count, dest } => write!(f, "UPLOAD {count} {dest}"),
            Self::Download { count } => write!(f, "DOWNLF {count}"),
            Self::Remove { count } => write!(f, "REMOVEF {count}"),
            Self::DownloadTar { ext } => write!(f, "DOWNLTAR {ext}"),
            Self::ListNames { path } => write!(f, "DISPFNAMES {path}"),
            Self::Quit => write!(f, "QUIT"),
        }
    }
}

/// Commands accepted by a backend store, from the gateway or tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// `STORE <dest> <name> <size>` followed by a body of exactly `size` bytes
    Store { dest: String, name: String, size: u64 },
    /// `FETCH <dest> <name>`
    Fetch { dest: String, name: String },
    /// `DELETE <dest> <name>`
    Delete { dest: String, name: String },
    /// `LIST <dest>`
    List { dest: String },
    /// `TARALL <ext>`
    TarAll { ext: String },
    /// `QUIT`
    Quit,
}

impl StoreCommand {
    /// Parses one store command line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        let verb = fields.next().unwrap_or("");
        match verb {
            "STORE" => {
                let (dest, name) = (fields.next(), fields.next());
                let size = fields.next().and_then(|s| s.parse::<u64>().ok());
                match (dest, name, size) {
                    (Some(dest), Some(name), Some(size)) => Ok(Self::Store {
                        dest: dest.to_string(),
                        name: name.to_string(),
                        size,
                    }),
                    _ => Err(ProtoError::Malformed("bad STORE".into())),
                }
            }
            "FETCH" => two_fields(fields, "bad FETCH")
                .map(|(dest, name)| Self::Fetch { dest, name }),
            "DELETE" => two_fields(fields, "bad DELETE")
                .map(|(dest, name)| Self::Delete { dest, name }),
            "LIST" => {
                let dest = fields
                    .next()
                    .ok_or_else(|| ProtoError::Malformed("bad LIST".into()))?;
                Ok(Self::List { dest: dest.to_string() })
            }
            "TARALL" => {
                let ext = fields
                    .next()
                    .ok_or_else(|| ProtoError::Malformed("bad TARALL".into()))?;
                Ok(Self::TarAll { ext: ext.to_string() })
            }
            "QUIT" => Ok(Self::Quit),
            _ => Err(ProtoError::Malformed("unknown".into())),
        }
    }
}

impl fmt::Display for StoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store { dest, name, size } => write!(f, "STORE {dest} {name} {size}"),
            Self::Fetch { dest, name } => write!(f, "FETCH {dest} {name}"),
            Self::Delete { dest, name } => write!(f, "DELETE {dest} {name}"),
            Self::List { dest } => write!(f, "LIST {dest}"),
            Self::TarAll { ext } => write!(f, "TARALL {ext}"),
            Self::Quit => write!(f, "QUIT"),
        }
    }
}

fn parse_count(field: Option<&str>, range: std::ops::RangeInclusive<usize>) -> Option<usize> {
    let count = field?.parse::<usize>().ok()?;
    range.contains(&count).then_some(count)
}

fn two_fields<'a>(
    mut fields: impl Iterator<Item = &'a str>,
    reason: &str,
) -> Result<(String, String)> {
    match (fields.next(), fields.next()) {
        (Some(a), Some(b)) => Ok((a.to_string(), b.to_string())),
        _ => Err(ProtoError::Malformed(reason.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_upload_bounds() {
        assert_eq!(
            GatewayCommand::parse("UPLOAD 2 ~depot/docs").unwrap(),
            GatewayCommand::Upload { count: 2, dest: "~depot/docs".into() }
        );
        assert!(GatewayCommand::parse("UPLOAD 0 x").is_err());
        assert!(GatewayCommand::parse("UPLOAD 4 x").is_err());
        assert!(GatewayCommand::parse("UPLOAD two x").is_err());
        assert!(GatewayCommand::parse("UPLOAD 2").is_err());
    }

    #[test]
    fn parse_download_and_remove_bounds() {
        assert_eq!(
            GatewayCommand::parse("DOWNLF 1").unwrap(),
            GatewayCommand::Download { count: 1 }
        );
        assert!(GatewayCommand::parse("DOWNLF 3").is_err());
        assert_eq!(
            GatewayCommand::parse("REMOVEF 2").unwrap(),
            GatewayCommand::Remove { count: 2 }
        );
        assert!(GatewayCommand::parse("REMOVEF 0").is_err());
    }

    #[test]
    fn parse_unknown_command() {
        match GatewayCommand::parse("FROBNICATE now") {
            Err(ProtoError::Malformed(reason)) => assert_eq!(reason, "unknown"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_store_command() {
        assert_eq!(
            StoreCommand::parse("STORE /x report.pdf 1234").unwrap(),
            StoreCommand::Store { dest: "/x".into(), name: "report.pdf".into(), size: 1234 }
        );
        assert!(StoreCommand::parse("STORE /x report.pdf -1").is_err());
        assert!(StoreCommand::parse("STORE /x report.pdf").is_err());
        assert_eq!(
            StoreCommand::parse("TARALL .pdf").unwrap(),
            StoreCommand::TarAll { ext: ".pdf".into() }
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let cmd = StoreCommand::Fetch { dest: "/x/y".into(), name: "a.txt".into() };
        assert_eq!(StoreCommand::parse(&cmd.to_string()).unwrap(), cmd);
        let cmd = GatewayCommand::DownloadTar { ext: ".c".into() };
        assert_eq!(GatewayCommand::parse(&cmd.to_string()).unwrap(), cmd);
    }

    #[test]
    fn ok_payload_forms() {
        assert_eq!(ok_payload("OK").unwrap(), "");
        assert_eq!(ok_payload("OK 42").unwrap(), "42");
        match ok_payload("ERR badpath") {
            Err(ProtoError::ErrReply(reason)) => assert_eq!(reason, "badpath"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(ok_payload("FILE x 3"), Err(ProtoError::UnexpectedReply(_))));
    }

    #[tokio::test]
    async fn read_line_strips_terminator_and_signals_eof() {
        let data: &[u8] = b"FETCH /x a.pdf\r\nLIST /\n";
        let mut reader = tokio::io::BufReader::new(data);
        assert_eq!(read_line(&mut reader).await.unwrap(), "FETCH /x a.pdf");
        assert_eq!(read_line(&mut reader).await.unwrap(), "LIST /");
        assert!(read_line_opt(&mut reader).await.unwrap().is_none());
        assert!(matches!(read_line(&mut reader).await, Err(ProtoError::Closed)));
    }
}

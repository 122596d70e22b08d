//! Main client implementation

use crate::{ClientError, Config, Result};
use depot_proto::line::{ok_payload, read_line, write_line};
use depot_proto::{copy_exact, GatewayCommand};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

/// Depot gateway client over one connection
pub struct DepotClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

/// Outcome of one requested download within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downloaded {
    /// Saved under its leaf name in the output directory
    Saved { name: String, size: u64 },
    /// Per-file error reported by the gateway
    Failed { reason: String },
}

/// Outcome of one requested removal within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    /// File removed from whichever store owned it
    Removed { name: String },
    /// Per-file error reported by the gateway
    Failed { reason: String },
}

impl DepotClient {
    /// Connect to the gateway named by the configuration
    pub async fn connect(config: Config) -> Result<Self> {
        let socket = TcpStream::connect(&config.addr).await.map_err(|source| {
            ClientError::Connect { addr: config.addr.clone(), source }
        })?;
        let (read_half, write_half) = socket.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Uploads up to three files under one destination. The leaf name of
    /// each source path becomes its name in the depot namespace. The single
    /// `OK` covers the whole batch.
    pub async fn upload(&mut self, files: &[PathBuf], dest: &str) -> Result<()> {
        if files.is_empty() || files.len() > GatewayCommand::MAX_UPLOAD {
            return Err(ClientError::BatchSize {
                got: files.len(),
                max: GatewayCommand::MAX_UPLOAD,
            });
        }

        // Stat everything up front so a bad source fails before any byte
        // goes on the wire.
        let mut batch = Vec::with_capacity(files.len());
        for path in files {
            let meta = tokio::fs::metadata(path).await.map_err(|e| ClientError::BadSource {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if !meta.is_file() {
                return Err(ClientError::BadSource {
                    path: path.clone(),
                    reason: "not a regular file".to_string(),
                });
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ClientError::BadSource {
                    path: path.clone(),
                    reason: "no usable filename".to_string(),
                })?
                .to_string();
            batch.push((path.clone(), name, meta.len()));
        }

        let cmd = GatewayCommand::Upload { count: batch.len(), dest: dest.to_string() };
        write_line(&mut self.writer, &cmd.to_string()).await?;
        for (path, name, size) in &batch {
            debug!(file = %path.display(), size, "uploading");
            write_line(&mut self.writer, &format!("NAME {name}")).await?;
            write_line(&mut self.writer, &format!("SIZE {size}")).await?;
            let mut file = File::open(path).await?;
            copy_exact(&mut file, &mut self.writer, *size).await?;
        }

        let reply = read_line(&mut self.reader).await?;
        ok_payload(&reply)?;
        Ok(())
    }

    /// Requests up to two logical paths, saving each returned file under
    /// its leaf name in `out_dir`. Per-file gateway errors become
    /// [`Downloaded::Failed`] entries; the batch itself still succeeds.
    pub async fn download_to(&mut self, paths: &[String], out_dir: &Path) -> Result<Vec<Downloaded>> {
        check_batch(paths.len())?;
        let cmd = GatewayCommand::Download { count: paths.len() };
        write_line(&mut self.writer, &cmd.to_string()).await?;
        for path in paths {
            write_line(&mut self.writer, &format!("PATH {path}")).await?;
        }

        let mut results = Vec::with_capacity(paths.len());
        for _ in 0..paths.len() {
            let header = read_line(&mut self.reader).await?;
            if let Some(rest) = header.strip_prefix("FILE ") {
                let (name, size) = parse_file_header(rest, &header)?;
                let mut file = File::create(out_dir.join(&name)).await?;
                copy_exact(&mut self.reader, &mut file, size).await?;
                results.push(Downloaded::Saved { name, size });
            } else if let Some(reason) = header.strip_prefix("ERR ") {
                results.push(Downloaded::Failed { reason: reason.to_string() });
            } else {
                return Err(ClientError::UnexpectedReply(header));
            }
        }
        Ok(results)
    }

    /// Removes up to two logical paths, one reply per file.
    pub async fn remove(&mut self, paths: &[String]) -> Result<Vec<Removed>> {
        check_batch(paths.len())?;
        let cmd = GatewayCommand::Remove { count: paths.len() };
        write_line(&mut self.writer, &cmd.to_string()).await?;
        for path in paths {
            write_line(&mut self.writer, &format!("PATH {path}")).await?;
        }

        let mut results = Vec::with_capacity(paths.len());
        for _ in 0..paths.len() {
            let reply = read_line(&mut self.reader).await?;
            if let Some(name) = reply.strip_prefix("OK ") {
                results.push(Removed::Removed { name: name.to_string() });
            } else if let Some(reason) = reply.strip_prefix("ERR ") {
                results.push(Removed::Failed { reason: reason.to_string() });
            } else {
                return Err(ClientError::UnexpectedReply(reply));
            }
        }
        Ok(results)
    }

    /// Downloads the archive for one extension class into `out_dir`,
    /// returning the archive's name and size.
    pub async fn download_tar(&mut self, ext: &str, out_dir: &Path) -> Result<(String, u64)> {
        let cmd = GatewayCommand::DownloadTar { ext: ext.to_string() };
        write_line(&mut self.writer, &cmd.to_string()).await?;

        let header = read_line(&mut self.reader).await?;
        if let Some(reason) = header.strip_prefix("ERR ") {
            return Err(ClientError::Server(reason.to_string()));
        }
        let Some(rest) = header.strip_prefix("TAR ") else {
            return Err(ClientError::UnexpectedReply(header));
        };
        let (name, size) = parse_file_header(rest, &header)?;
        let mut file = File::create(out_dir.join(&name)).await?;
        copy_exact(&mut self.reader, &mut file, size).await?;
        Ok((name, size))
    }

    /// Unified listing for one destination: local-class names first, then
    /// each backend store's contribution, as ordered by the gateway.
    pub async fn list_names(&mut self, path: &str) -> Result<Vec<String>> {
        let cmd = GatewayCommand::ListNames { path: path.to_string() };
        write_line(&mut self.writer, &cmd.to_string()).await?;

        let header = read_line(&mut self.reader).await?;
        if let Some(reason) = header.strip_prefix("ERR ") {
            return Err(ClientError::Server(reason.to_string()));
        }
        let count = header
            .strip_prefix("NAMES ")
            .and_then(|f| f.trim().parse::<usize>().ok())
            .ok_or_else(|| ClientError::UnexpectedReply(header.clone()))?;

        let mut names = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let line = read_line(&mut self.reader).await?;
            match line.strip_prefix("NAME ") {
                Some(name) => names.push(name.to_string()),
                None => return Err(ClientError::UnexpectedReply(line)),
            }
        }
        Ok(names)
    }

    /// Sends `QUIT` and drops the connection.
    pub async fn quit(mut self) -> Result<()> {
        write_line(&mut self.writer, &GatewayCommand::Quit.to_string()).await?;
        Ok(())
    }
}

fn check_batch(got: usize) -> Result<()> {
    if got == 0 || got > GatewayCommand::MAX_BATCH {
        return Err(ClientError::BatchSize { got, max: GatewayCommand::MAX_BATCH });
    }
    Ok(())
}

/// Parses `<name> <size>` from a `FILE`/`TAR` header, refusing names that
/// would escape the output directory.
fn parse_file_header(rest: &str, header: &str) -> Result<(String, u64)> {
    let mut fields = rest.split_whitespace();
    let name = fields.next().unwrap_or_default();
    let size = fields.next().and_then(|f| f.parse::<u64>().ok());
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(ClientError::UnexpectedReply(header.to_string()));
    }
    match size {
        Some(size) => Ok((name.to_string(), size)),
        None => Err(ClientError::UnexpectedReply(header.to_string())),
    }
}

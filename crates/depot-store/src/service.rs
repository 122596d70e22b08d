//! Per-connection store protocol loop
//!
//! One command per exchange: a line, an optional body, a reply. Errors that
//! leave the stream position untrustworthy (a body that could not be fully
//! read, a malformed known command) close the connection after the `ERR`
//! reply; per-item errors on `DELETE` and `LIST` reply and keep the loop
//! alive, matching the gateway's one-connection-per-operation usage.

use crate::{Result, StoreConfig, StoreError};
use depot_core::{build_tar, list_names_by_ext, safe_file_name, ArchiveSpool, VirtualPath};
use depot_proto::line::{read_line_opt, write_line};
use depot_proto::{copy_exact, ProtoError, StoreCommand};
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufRead, BufReader, BufWriter};
use tokio::net::TcpStream;
use tracing::debug;

/// Serves one accepted connection until `QUIT`, disconnect, or a stream
/// error.
pub async fn handle_connection(socket: TcpStream, config: &StoreConfig) -> Result<()> {
    let (read_half, write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    loop {
        let line = match read_line_opt(&mut reader).await? {
            Some(line) => line,
            None => break,
        };
        let cmd = match StoreCommand::parse(&line) {
            Ok(cmd) => cmd,
            Err(ProtoError::Malformed(reason)) => {
                write_line(&mut writer, &format!("ERR {reason}")).await?;
                if reason == "unknown" {
                    continue;
                }
                break;
            }
            Err(e) => return Err(e.into()),
        };
        debug!(command = %cmd, "store command");

        match cmd {
            StoreCommand::Quit => break,

            StoreCommand::Store { dest, name, size } => {
                match receive_store(&mut reader, config, &dest, &name, size).await {
                    Ok(()) => write_line(&mut writer, "OK").await?,
                    Err(e) => {
                        write_line(&mut writer, &format!("ERR {}", e.wire_tag())).await?;
                        break;
                    }
                }
            }

            StoreCommand::Fetch { dest, name } => {
                match open_stored(config, &dest, &name).await {
                    Ok((mut file, size)) => {
                        write_line(&mut writer, &format!("OK {size}")).await?;
                        copy_exact(&mut file, &mut writer, size).await?;
                    }
                    Err(e) => {
                        write_line(&mut writer, &format!("ERR {}", e.wire_tag())).await?;
                        break;
                    }
                }
            }

            StoreCommand::Delete { dest, name } => match delete_stored(config, &dest, &name).await
            {
                Ok(()) => write_line(&mut writer, "OK").await?,
                Err(e) => write_line(&mut writer, &format!("ERR {}", e.wire_tag())).await?,
            },

            StoreCommand::List { dest } => match list_stored(config, &dest).await {
                Ok(names) => {
                    write_line(&mut writer, &format!("OK {}", names.len())).await?;
                    for name in names {
                        write_line(&mut writer, &format!("NAME {name}")).await?;
                    }
                }
                Err(e) => write_line(&mut writer, &format!("ERR {}", e.wire_tag())).await?,
            },

            StoreCommand::TarAll { ext } => match archive_all(config, &ext).await {
                Ok(spool) => {
                    write_line(&mut writer, &format!("OK {}", spool.size())).await?;
                    let mut file = File::from_std(spool.open()?);
                    copy_exact(&mut file, &mut writer, spool.size()).await?;
                }
                Err(e) => {
                    write_line(&mut writer, &format!("ERR {}", e.wire_tag())).await?;
                    break;
                }
            },
        }
    }
    Ok(())
}

/// Receives a `STORE` body into `dest/name`, creating missing directories.
/// A partial write is removed before the error propagates.
async fn receive_store<R>(
    reader: &mut R,
    config: &StoreConfig,
    dest: &str,
    name: &str,
    size: u64,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let vpath = VirtualPath::dir(dest)?;
    let name = safe_file_name(name)?;
    let dir = vpath.dest_dir(&config.root);
    fs::create_dir_all(&dir).await.map_err(StoreError::CreateDir)?;

    let full = dir.join(name);
    if let Err(e) = write_body(reader, &full, size).await {
        let _ = fs::remove_file(&full).await;
        return Err(e);
    }
    Ok(())
}

async fn write_body<R>(reader: &mut R, full: &Path, size: u64) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut file = File::create(full).await?;
    copy_exact(reader, &mut file, size).await?;
    file.sync_all().await?;
    Ok(())
}

async fn open_stored(config: &StoreConfig, dest: &str, name: &str) -> Result<(File, u64)> {
    let vpath = VirtualPath::dir(dest)?;
    let name = safe_file_name(name)?;
    let full = vpath.dest_dir(&config.root).join(name);
    let file = match File::open(&full).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let size = file.metadata().await?.len();
    Ok((file, size))
}

async fn delete_stored(config: &StoreConfig, dest: &str, name: &str) -> Result<()> {
    let vpath = VirtualPath::dir(dest)?;
    let name = safe_file_name(name)?;
    let full = vpath.dest_dir(&config.root).join(name);
    match fs::remove_file(&full).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_stored(config: &StoreConfig, dest: &str) -> Result<Vec<String>> {
    let vpath = VirtualPath::dir(dest)?;
    let dir = vpath.dest_dir(&config.root);
    let ext = config.ext.clone();
    let names = tokio::task::spawn_blocking(move || list_names_by_ext(&dir, &ext))
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))??;
    Ok(names)
}

async fn archive_all(config: &StoreConfig, requested: &str) -> Result<ArchiveSpool> {
    let wanted = requested.trim_start_matches('.');
    if !wanted.eq_ignore_ascii_case(&config.ext) {
        return Err(StoreError::WrongExtension {
            requested: requested.to_string(),
            serves: config.ext.clone(),
        });
    }
    let root = config.root.clone();
    let ext = config.ext.clone();
    let spool = tokio::task::spawn_blocking(move || build_tar(&root, &ext))
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))??;
    Ok(spool)
}

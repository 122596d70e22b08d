//! `UPLOAD` - receive a batch of files into the unified namespace
//!
//! Bodies are always written under the gateway root first, whatever their
//! extension class; the single `OK` covers the whole batch. Routed-class
//! files are then handed to the relocation task, which must never delay or
//! affect the client's acknowledgment.

use super::read_field;
use crate::{relocate, GatewayConfig, GatewayError, Result};
use depot_core::{safe_file_name, RouteTarget, RoutingTable, VirtualPath};
use depot_proto::line::write_line;
use depot_proto::{copy_exact, ProtoError};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufRead, AsyncWrite};

pub async fn handle<R, W>(
    reader: &mut R,
    writer: &mut W,
    config: &Arc<GatewayConfig>,
    routes: &RoutingTable,
    count: usize,
    dest_raw: &str,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let stripped = VirtualPath::strip_alias(dest_raw, &config.root_alias);
    let dest = match VirtualPath::dir(stripped) {
        Ok(dest) => dest,
        Err(_) => {
            write_line(writer, "ERR badpath").await?;
            return Ok(());
        }
    };
    let dest_dir = dest.dest_dir(&config.root);
    if fs::create_dir_all(&dest_dir).await.is_err() {
        write_line(writer, "ERR makedir").await?;
        return Ok(());
    }

    let mut routed = Vec::new();
    for _ in 0..count {
        let name = read_field(reader, writer, "NAME").await?;
        let name = match safe_file_name(&name) {
            Ok(name) => name.to_string(),
            Err(e) => {
                write_line(writer, "ERR badname").await?;
                return Err(e.into());
            }
        };
        let size_field = read_field(reader, writer, "SIZE").await?;
        let Ok(size) = size_field.parse::<u64>() else {
            write_line(writer, "ERR sizeparse").await?;
            return Err(ProtoError::Malformed("sizeparse".into()).into());
        };

        let full = dest_dir.join(&name);
        if let Err(e) = receive_body(reader, &full, size).await {
            let _ = fs::remove_file(&full).await;
            let tag = match &e {
                GatewayError::Io(_) => "disk",
                _ => "stream",
            };
            write_line(writer, &format!("ERR {tag}")).await?;
            return Err(e);
        }

        if let RouteTarget::Store(idx) = routes.classify(&name) {
            routed.push((idx, name, full));
        }
    }

    write_line(writer, "OK").await?;

    // Relocation starts only after the acknowledgment is on the wire; the
    // client never waits on it or learns its outcome.
    for (idx, name, full) in routed {
        relocate::spawn(Arc::clone(config), idx, dest.wire_dest(), name, full);
    }
    Ok(())
}

async fn receive_body<R>(reader: &mut R, full: &Path, size: u64) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut file = File::create(full).await?;
    copy_exact(reader, &mut file, size).await?;
    file.sync_all().await?;
    Ok(())
}

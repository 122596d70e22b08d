//! `REMOVEF` - unlink files from whichever store owns them
//!
//! Replies `OK <name>` or an error line per file, independently. Names
//! without any extension fall back to a local unlink; unknown extensions
//! are rejected instead of silently defaulting.

use super::download::parse_file_path;
use super::read_field;
use crate::{GatewayConfig, GatewayError, Result};
use depot_core::{file_extension, RouteTarget, RoutingTable, VirtualPath};
use depot_proto::line::write_line;
use depot_store::StoreClient;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

pub async fn handle<R, W>(
    reader: &mut R,
    writer: &mut W,
    config: &GatewayConfig,
    routes: &RoutingTable,
    count: usize,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    for _ in 0..count {
        let raw = read_field(reader, writer, "PATH").await?;
        let vpath = match parse_file_path(&raw, &config.root_alias) {
            Ok(vpath) => vpath,
            Err((tag, e)) => {
                write_line(writer, &format!("ERR {tag}")).await?;
                return Err(e.into());
            }
        };
        let name = vpath.name().unwrap_or_default().to_string();

        let removed = match routes.classify(&name) {
            RouteTarget::Local => remove_local(&vpath, &config.root).await,
            RouteTarget::Store(idx) => {
                let client = StoreClient::new(&config.stores[idx].addr);
                client
                    .delete(&vpath.wire_dest(), &name)
                    .await
                    .map_err(Into::into)
            }
            RouteTarget::Unsupported if file_extension(&name).is_none() => {
                remove_local(&vpath, &config.root).await
            }
            RouteTarget::Unsupported => {
                write_line(writer, &format!("ERR type {name}")).await?;
                continue;
            }
        };
        match removed {
            Ok(()) => write_line(writer, &format!("OK {name}")).await?,
            Err(e) => {
                debug!(error = %e, file = %name, "remove failed");
                write_line(writer, &format!("ERR {name}")).await?;
            }
        }
    }
    Ok(())
}

async fn remove_local(vpath: &VirtualPath, root: &Path) -> Result<()> {
    let full = vpath.resolve(root);
    match fs::remove_file(&full).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(GatewayError::NotFound(
            vpath.name().unwrap_or_default().to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

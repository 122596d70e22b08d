//! `DOWNLF` - stream requested files back to the client
//!
//! Local-class files stream straight from the gateway root; routed-class
//! files are fetched from their backend store and relayed under the same
//! `FILE <name> <size>` framing. A missing file or unsupported extension
//! costs only that request; the batch continues.

use super::read_field;
use crate::{GatewayConfig, GatewayError, Result};
use depot_core::{PathError, RouteTarget, RoutingTable, VirtualPath};
use depot_proto::line::write_line;
use depot_proto::copy_exact;
use depot_store::StoreClient;
use std::io;
use std::path::Path;
use tokio::fs::File;
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

        match routes.classify(&name) {
            RouteTarget::Local => match open_local(&vpath, &config.root).await {
                Ok((mut file, size)) => {
                    write_line(writer, &format!("FILE {name} {size}")).await?;
                    copy_exact(&mut file, writer, size).await?;
                }
                Err(e) => {
                    debug!(error = %e, file = %name, "local download failed");
                    write_line(writer, &format!("ERR nofile {name}")).await?;
                }
            },
            RouteTarget::Store(idx) => {
                let store = &config.stores[idx];
                let client = StoreClient::new(&store.addr);
                match client.fetch(&vpath.wire_dest(), &name).await {
                    Ok(stream) => {
                        write_line(writer, &format!("FILE {} {}", name, stream.size())).await?;
                        stream.relay(writer).await?;
                    }
                    Err(e) => {
                        debug!(error = %e, store = %store.name, file = %name, "fetch failed");
                        write_line(writer, &format!("ERR fetch {name}")).await?;
                    }
                }
            }
            RouteTarget::Unsupported => {
                write_line(writer, &format!("ERR type {name}")).await?;
            }
        }
    }
    Ok(())
}

/// Normalizes a client path into destination + filename, mapping each
/// failure onto its wire reason. Both shapes abort the connection.
pub(super) fn parse_file_path(
    raw: &str,
    alias: &str,
) -> std::result::Result<VirtualPath, (&'static str, PathError)> {
    let stripped = VirtualPath::strip_alias(raw, alias);
    VirtualPath::file(stripped).map_err(|e| match e {
        PathError::Traversal => ("badpath", e),
        _ => ("badname", e),
    })
}

async fn open_local(vpath: &VirtualPath, root: &Path) -> Result<(File, u64)> {
    let full = vpath.resolve(root);
    let file = match File::open(&full).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(GatewayError::NotFound(
                vpath.name().unwrap_or_default().to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };
    let size = file.metadata().await?.len();
    Ok((file, size))
}

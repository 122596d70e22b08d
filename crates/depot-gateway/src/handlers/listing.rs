//! `DISPFNAMES` - unified listing across all stores
//!
//! Local-class names come first, sorted, then each backend store's sorted
//! contribution in configuration order. An unreachable store degrades to
//! zero entries rather than failing the whole listing.

use crate::{GatewayConfig, GatewayError, Result};
use depot_core::{list_names_by_ext, VirtualPath};
use depot_proto::line::write_line;
use depot_store::StoreClient;
use std::io;
use tokio::io::AsyncWrite;
use tracing::warn;

pub async fn handle<W>(writer: &mut W, config: &GatewayConfig, path_raw: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let stripped = VirtualPath::strip_alias(path_raw, &config.root_alias);
    let vpath = match VirtualPath::dir(stripped) {
        Ok(vpath) => vpath,
        Err(_) => {
            write_line(writer, "ERR badpath").await?;
            return Ok(());
        }
    };

    let local_dir = vpath.dest_dir(&config.root);
    let local_ext = config.local_ext.clone();
    let local = tokio::task::spawn_blocking(move || list_names_by_ext(&local_dir, &local_ext))
        .await
        .map_err(|e| GatewayError::Io(io::Error::other(e)))?
        .unwrap_or_default();

    let mut sections: Vec<Vec<String>> = vec![local];
    let wire_dest = vpath.wire_dest();
    for store in &config.stores {
        let client = StoreClient::new(&store.addr);
        let names = match client.list(&wire_dest).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, store = %store.name, "listing degraded: store unavailable");
                Vec::new()
            }
        };
        sections.push(names);
    }

    let total: usize = sections.iter().map(Vec::len).sum();
    write_line(writer, &format!("NAMES {total}")).await?;
    for name in sections.iter().flatten() {
        write_line(writer, &format!("NAME {name}")).await?;
    }
    Ok(())
}

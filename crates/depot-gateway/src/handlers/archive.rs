//! `DOWNLTAR` - bulk download of one extension class as a tar archive
//!
//! The local class is scanned and bundled from the gateway's own root; a
//! routed class is delegated to its backend store via `TARALL` and the
//! declared-length stream relayed under the gateway's own `TAR` framing.

use crate::{GatewayConfig, Result};
use depot_core::{build_tar, RouteTarget, RoutingTable};
use depot_proto::copy_exact;
use depot_proto::line::write_line;
use depot_store::StoreClient;
use tokio::fs::File;
use tokio::io::AsyncWrite;
use tracing::warn;

pub async fn handle<W>(
    writer: &mut W,
    config: &GatewayConfig,
    routes: &RoutingTable,
    ext: &str,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    match routes.class_for_ext(ext) {
        RouteTarget::Local => {
            let root = config.root.clone();
            let local_ext = config.local_ext.clone();
            let built = tokio::task::spawn_blocking(move || build_tar(&root, &local_ext)).await;
            let spool = match built {
                Ok(Ok(spool)) => spool,
                Ok(Err(e)) => {
                    warn!(error = %e, "local archive build failed");
                    write_line(writer, "ERR tar").await?;
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "local archive build failed");
                    write_line(writer, "ERR tar").await?;
                    return Ok(());
                }
            };
            write_line(
                writer,
                &format!("TAR {} {}", config.local_tar_name, spool.size()),
            )
            .await?;
            let mut file = File::from_std(spool.open()?);
            copy_exact(&mut file, writer, spool.size()).await?;
        }
        RouteTarget::Store(idx) => {
            let store = &config.stores[idx];
            // Classes without an archive name are off the DOWNLTAR surface.
            let Some(tar_name) = &store.tar_name else {
                write_line(writer, "ERR ext").await?;
                return Ok(());
            };
            let client = StoreClient::new(&store.addr);
            match client.tar_all(ext).await {
                Ok(stream) => {
                    write_line(writer, &format!("TAR {} {}", tar_name, stream.size())).await?;
                    stream.relay(writer).await?;
                }
                Err(e) => {
                    warn!(error = %e, store = %store.name, "archive delegation failed");
                    write_line(writer, "ERR fetch").await?;
                }
            }
        }
        RouteTarget::Unsupported => {
            write_line(writer, "ERR ext").await?;
        }
    }
    Ok(())
}

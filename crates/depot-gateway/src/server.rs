//! Server startup and lifecycle

use crate::{connection, relocate, GatewayConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Run the gateway server
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, config).await
}

/// Serve on an already-bound listener
pub async fn serve(listener: TcpListener, config: GatewayConfig) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.root).await?;
    let addr = listener.local_addr()?;
    let config = Arc::new(config);

    // Routed-class files left under the root are relocations that never
    // completed; pick them back up before taking traffic.
    relocate::sweep(Arc::clone(&config));

    info!("🚀 depot gateway listening on {}", addr);
    info!(
        "🗂  local class .{} under {}, {} backend stores",
        config.local_ext,
        config.root.display(),
        config.stores.len()
    );

    loop {
        let (socket, peer) = listener.accept().await?;
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            debug!(%peer, "client connected");
            match connection::handle(socket, config).await {
                Ok(()) => debug!(%peer, "client disconnected"),
                Err(e) => warn!(error = %e, %peer, "connection ended with error"),
            }
        });
    }
}

//! Server startup and lifecycle

use crate::{service, StoreConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Run the store service
pub async fn run_server(config: StoreConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, config).await
}

/// Serve on an already-bound listener
pub async fn serve(listener: TcpListener, config: StoreConfig) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.root).await?;
    let addr = listener.local_addr()?;
    info!(
        "📦 depot store [.{}] listening on {}, root={}",
        config.ext,
        addr,
        config.root.display()
    );

    let config = Arc::new(config);
    loop {
        let (socket, peer) = listener.accept().await?;
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            debug!(%peer, "store connection accepted");
            if let Err(e) = service::handle_connection(socket, &config).await {
                warn!(error = %e, %peer, "store connection ended with error");
            }
        });
    }
}

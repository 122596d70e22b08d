//! Background relocation of routed uploads
//!
//! After the client's `OK`, each routed-class file is moved to its backend
//! store by a spawned task: open the local copy, `STORE` it, delete the
//! local copy only on the store's acknowledgment. The client never observes
//! the outcome.
//!
//! The local copy doubles as the durable record of a pending relocation: a
//! routed-class file sitting under the gateway root means the move has not
//! completed, so the startup sweep re-enqueues every such file. Retries are
//! bounded; an abandoned file stays local until the next sweep.

use crate::{GatewayConfig, Result};
use depot_core::{RouteTarget, RoutingTable};
use depot_store::StoreClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tracing::{debug, error, info, warn};

/// Spawns the relocation task for one uploaded file. Returns immediately;
/// the client-visible acknowledgment must never wait on this.
pub fn spawn(
    config: Arc<GatewayConfig>,
    store_idx: usize,
    dest: String,
    name: String,
    local: PathBuf,
) {
    tokio::spawn(async move {
        run(config, store_idx, dest, name, local).await;
    });
}

async fn run(
    config: Arc<GatewayConfig>,
    store_idx: usize,
    dest: String,
    name: String,
    local: PathBuf,
) {
    let store = &config.stores[store_idx];
    let client = StoreClient::new(&store.addr);
    for attempt in 1..=config.relocate_attempts {
        match try_relocate(&client, &dest, &name, &local).await {
            Ok(()) => {
                match tokio::fs::remove_file(&local).await {
                    Ok(()) => debug!(file = %local.display(), store = %store.name, "relocated"),
                    Err(e) => warn!(
                        error = %e,
                        file = %local.display(),
                        "relocated but the local copy could not be removed"
                    ),
                }
                return;
            }
            Err(e) => {
                warn!(
                    attempt,
                    error = %e,
                    file = %local.display(),
                    store = %store.name,
                    "relocation attempt failed"
                );
                if attempt < config.relocate_attempts {
                    tokio::time::sleep(config.relocate_retry_delay).await;
                }
            }
        }
    }
    error!(
        file = %local.display(),
        store = %store.name,
        attempts = config.relocate_attempts,
        "relocation abandoned; file stays local until the next startup sweep"
    );
}

async fn try_relocate(client: &StoreClient, dest: &str, name: &str, local: &Path) -> Result<()> {
    let mut file = File::open(local).await?;
    let size = file.metadata().await?.len();
    client.store(dest, name, size, &mut file).await?;
    Ok(())
}

/// Sweeps the gateway root for routed-class files left behind by an earlier
/// run and re-enqueues their relocation.
pub fn sweep(config: Arc<GatewayConfig>) {
    tokio::spawn(async move {
        let routes = config.routing_table();
        let root = config.root.clone();
        let pending =
            match tokio::task::spawn_blocking(move || scan_pending(&root, &routes)).await {
                Ok(pending) => pending,
                Err(e) => {
                    error!(error = %e, "relocation sweep failed");
                    return;
                }
            };
        if !pending.is_empty() {
            info!(count = pending.len(), "re-enqueueing relocations from an earlier run");
        }
        for entry in pending {
            spawn(
                Arc::clone(&config),
                entry.store_idx,
                entry.dest,
                entry.name,
                entry.local,
            );
        }
    });
}

struct Pending {
    store_idx: usize,
    dest: String,
    name: String,
    local: PathBuf,
}

fn scan_pending(root: &Path, routes: &RoutingTable) -> Vec<Pending> {
    let mut pending = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let RouteTarget::Store(store_idx) = routes.classify(&name) else {
            continue;
        };
        let rel_dir = entry
            .path()
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = if rel_dir.is_empty() { "/".to_string() } else { rel_dir };
        pending.push(Pending {
            store_idx,
            dest,
            name,
            local: entry.path().to_path_buf(),
        });
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::RoutingTable;
    use std::fs;

    #[test]
    fn sweep_scan_finds_only_routed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();
        fs::write(dir.path().join("keep.c"), b"local").unwrap();
        fs::write(dir.path().join("x/y/move.pdf"), b"routed").unwrap();
        fs::write(dir.path().join("top.txt"), b"routed too").unwrap();
        fs::write(dir.path().join("noext"), b"ignored").unwrap();

        let routes = RoutingTable::new("c", ["pdf".into(), "txt".into(), "zip".into()]);
        let mut pending = scan_pending(dir.path(), &routes);
        pending.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].name, "move.pdf");
        assert_eq!(pending[0].store_idx, 0);
        assert_eq!(pending[0].dest, "x/y");
        assert_eq!(pending[1].name, "top.txt");
        assert_eq!(pending[1].store_idx, 1);
        assert_eq!(pending[1].dest, "/");
    }
}

//! Gateway configuration

use depot_core::RoutingTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One routed backend store as seen from the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name used in logs
    pub name: String,
    /// Extension class routed to this store (lowercase, without the dot)
    pub ext: String,
    /// `host:port` of the store service
    pub addr: String,
    /// Archive filename offered through `DOWNLTAR`; `None` keeps the class
    /// off the archive surface
    pub tar_name: Option<String>,
}

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Root directory for files of the local extension class
    pub root: PathBuf,
    /// Symbolic prefix clients may use for paths under the gateway root
    pub root_alias: String,
    /// Extension class kept under the gateway's own root
    pub local_ext: String,
    /// Archive filename for the local class
    pub local_tar_name: String,
    /// Backend stores, in routing and listing order
    pub stores: Vec<BackendConfig>,
    /// Relocation attempts per uploaded file before giving up
    pub relocate_attempts: u32,
    /// Delay between relocation attempts
    pub relocate_retry_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6201,
            root: PathBuf::from("./data/gateway"),
            root_alias: "~depot".to_string(),
            local_ext: "c".to_string(),
            local_tar_name: "cfiles.tar".to_string(),
            stores: vec![
                BackendConfig {
                    name: "pdf".to_string(),
                    ext: "pdf".to_string(),
                    addr: "127.0.0.1:6202".to_string(),
                    tar_name: Some("pdf.tar".to_string()),
                },
                BackendConfig {
                    name: "txt".to_string(),
                    ext: "txt".to_string(),
                    addr: "127.0.0.1:6203".to_string(),
                    tar_name: Some("text.tar".to_string()),
                },
                BackendConfig {
                    name: "zip".to_string(),
                    ext: "zip".to_string(),
                    addr: "127.0.0.1:6204".to_string(),
                    tar_name: None,
                },
            ],
            relocate_attempts: 3,
            relocate_retry_delay: Duration::from_secs(2),
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the routing table: the local class plus each store's class in
    /// configuration order.
    pub fn routing_table(&self) -> RoutingTable {
        RoutingTable::new(&self.local_ext, self.stores.iter().map(|s| s.ext.clone()))
    }
}

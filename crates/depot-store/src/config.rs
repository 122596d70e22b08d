//! Store service configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend store service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Root directory holding this store's files
    pub root: PathBuf,
    /// Extension class this store serves (lowercase, without the dot)
    pub ext: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6202,
            root: PathBuf::from("./data/store"),
            ext: "pdf".to_string(),
        }
    }
}

impl StoreConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

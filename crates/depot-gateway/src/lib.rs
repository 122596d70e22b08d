//! # Depot Gateway
//!
//! Front end of the depot distributed file store. Clients see one logical
//! namespace; the gateway keeps its own extension class on local disk and
//! places every other supported class into the backend store owning it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Clients                         │
//! │         (depot REPL, DepotClient SDK, ...)          │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ line protocol + framed bodies
//! ┌─────────────────────────▼───────────────────────────┐
//! │                   Depot Gateway                     │
//! ├─────────────────────────────────────────────────────┤
//! │  Command loop │ Path sanitizer │ Extension router   │
//! ├─────────────────────────────────────────────────────┤
//! │   Command handlers (upload, download, remove,       │
//! │   archive, listing) + background relocation         │
//! ├──────────────┬──────────────────────────────────────┤
//! │  local root  │            StoreClient               │
//! │   (.c files) │   ┌──────────┬──────────┬─────────┐  │
//! └──────────────┘   │ pdf store│ txt store│zip store│  │
//!                    └──────────┴──────────┴─────────┘
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod relocate;
pub mod server;

pub use config::{BackendConfig, GatewayConfig};
pub use error::{GatewayError, Result};
pub use server::{run_server, serve};

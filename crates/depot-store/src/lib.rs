//! # Depot Backend Store
//!
//! A standalone network service holding the files of exactly one extension
//! class under its own root directory. The gateway forwards routed uploads
//! here and reaches back for downloads, removals, listings, and archives.
//!
//! The crate carries both halves of the store protocol:
//! - the **service**: a per-connection loop answering `STORE` / `FETCH` /
//!   `DELETE` / `LIST` / `TARALL` / `QUIT` (run by the `depot-store` binary),
//! - the **client** ([`StoreClient`]): one async method per operation,
//!   opening one connection per exchange, used by the gateway and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod service;

pub use client::{FetchStream, StoreClient};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use server::{run_server, serve};

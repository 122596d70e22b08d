//! # Depot Client
//!
//! Client SDK for the depot storage gateway: one connection, one async
//! method per gateway command. The `depot` binary wraps it in an
//! interactive command loop.

pub mod client;
pub mod config;
pub mod error;

pub use client::{DepotClient, Downloaded, Removed};
pub use config::Config;
pub use error::{ClientError, Result};

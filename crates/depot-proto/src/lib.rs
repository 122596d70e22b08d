//! Wire protocol shared by the depot gateway, its backend stores, and clients.
//!
//! Both sides of the system speak the same shape of protocol: newline-terminated
//! command lines, optionally followed by a fixed-length binary body whose exact
//! size was announced on the preceding line. This crate owns the two command
//! grammars ([`GatewayCommand`] for the client-facing surface,
//! [`StoreCommand`] for the store-facing surface), the line I/O helpers, and
//! the framed body transfer primitive [`copy_exact`].

pub mod error;
pub mod frame;
pub mod line;

pub use error::{ProtoError, Result};
pub use frame::copy_exact;
pub use line::{GatewayCommand, StoreCommand, ok_payload, read_line, read_line_opt, write_line};

//! Core logic for the depot storage gateway.
//!
//! Everything here is synchronous and filesystem-local on purpose: the
//! gateway and the store services call into this crate from their async
//! connection handlers (blocking pieces through `spawn_blocking`), so the
//! same path rules, routing decisions, and archive construction apply on
//! both sides of the store protocol.

pub mod archive;
pub mod listing;
pub mod path;
pub mod route;

pub use archive::{build_tar, ArchiveError, ArchiveSpool};
pub use listing::list_names_by_ext;
pub use path::{safe_file_name, PathError, VirtualPath};
pub use route::{file_extension, RouteTarget, RoutingTable};

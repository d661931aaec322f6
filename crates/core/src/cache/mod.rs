//! Versioned response cache.
//!
//! Responses are stored per namespace, one namespace per cache version.
//! Two backends implement [`CacheStorage`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, versioned migrations,
//!   entries cascade-deleted with their namespace
//! - [`MemoryStorage`]: in-process map for tests and ephemeral hosts
//!
//! [`CacheStore`] is the handle the worker's strategies use; it is bound to a
//! single namespace.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod identity;
pub mod memory;
pub mod migrations;
pub mod namespaces;
pub mod storage;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntry;
pub use identity::{CacheVersion, RequestIdentity};
pub use memory::MemoryStorage;
pub use namespaces::NamespaceInfo;
pub use storage::CacheStorage;
pub use store::CacheStore;

//! Core types and shared functionality for transit-shell.
//!
//! This crate provides:
//! - Versioned cache storage with SQLite and in-memory backends
//! - Request/response types shared by the worker and its hosts
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod shell;

pub use cache::{CacheDb, CacheEntry, CacheStorage, CacheStore, CacheVersion, MemoryStorage, RequestIdentity};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Request, Response, ResponseSource};
pub use shell::ShellManifest;

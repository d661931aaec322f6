//! Cache inspection MCP tools.
//!
//! Both tools read the worker's storage; neither writes to it.

pub mod get;
pub mod status;

pub use get::{CacheGetParams, get_impl};
pub use status::status_impl;

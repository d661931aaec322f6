//! Client side of transit-shell.
//!
//! This crate provides the HTTP fetch pipeline and the worker that routes
//! intercepted requests between the network and the version-scoped cache.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network, canonicalize};
pub use worker::{
    ActivateReport, BootReport, CacheLifecycleManager, InstallReport, LifecycleState, RequestRouter, RouteClass,
    Worker, WorkerConfig,
};

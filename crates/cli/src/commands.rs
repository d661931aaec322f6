//! Subcommand implementations.
//!
//! Each invocation is a fresh process, so commands that need an installed
//! worker first adopt the shell already cached for this version.

use std::io::Write;

use anyhow::{Result, bail};
use serde_json::json;
use transit_client::Worker;
use transit_core::Request;

use crate::args::{FetchArgs, GetArgs};

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn install(worker: &Worker) -> Result<()> {
    let report = worker.on_install().await?;
    tracing::info!(namespace = %worker.version().namespace(), "shell installed");
    print_json(&report)
}

pub async fn activate(worker: &Worker) -> Result<()> {
    if worker.resume().await?.is_none() {
        bail!("no complete shell cached for version {}; run `transit install` first", worker.version());
    }
    let report = worker.on_activate().await?;
    tracing::info!(namespace = %worker.version().namespace(), "worker active");
    print_json(&report)
}

pub async fn fetch(worker: &Worker, args: FetchArgs) -> Result<()> {
    worker.boot().await?;

    let mut request = Request::new(&args.method, worker.resolve(&args.url)?);
    for (name, value) in args.headers {
        request = request.with_header(name, value);
    }
    if let Some(data) = args.data {
        request = request.with_body(data);
    }

    let route = worker.classify(&request);
    tracing::debug!(method = %request.method, url = %request.url, route = %route, "dispatching request");
    let response = worker.on_request(request).await?;
    eprintln!("{} {} ({}, {})", response.status, response.url, response.source, route);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.body)?;
    stdout.flush()?;
    Ok(())
}

pub async fn get(worker: &Worker, args: &GetArgs) -> Result<()> {
    let identity = Request::get(worker.resolve(&args.url)?).identity();
    let store = worker.store();
    let Some(entry) = store.get(&identity).await? else {
        bail!("{identity} is not cached in {}", store.namespace());
    };

    print_json(&json!({
        "namespace": store.namespace(),
        "identity": entry.identity,
        "status": entry.status,
        "final_url": entry.final_url,
        "stored_at": entry.stored_at,
        "headers": entry.headers,
        "body_bytes": entry.body.len(),
    }))
}

pub async fn status(worker: &Worker) -> Result<()> {
    worker.resume().await?;
    let current = worker.version().namespace();
    let namespaces: Vec<_> = worker
        .namespaces()
        .await?
        .into_iter()
        .map(|ns| {
            json!({
                "name": ns.name,
                "created_at": ns.created_at,
                "entries": ns.entries,
                "current": ns.name == current,
            })
        })
        .collect();

    print_json(&json!({
        "origin": worker.origin().as_str(),
        "version": worker.version().version(),
        "namespace": current,
        "state": worker.state().await,
        "namespaces": namespaces,
    }))
}

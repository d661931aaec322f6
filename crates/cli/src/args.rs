//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// transit - offline-resilient request worker
///
/// Installs the app shell into a versioned cache and routes requests
/// between the network and that cache.
#[derive(Parser, Debug)]
#[command(name = "transit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TRANSIT_CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Precache the app shell into the current cache version
    Install,

    /// Delete stale cache versions and start serving
    Activate,

    /// Route a request through the worker
    Fetch(FetchArgs),

    /// Show the cached response for a URL
    Get(GetArgs),

    /// Show lifecycle state and cache namespaces
    Status,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL, or a path resolved against the configured origin
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(short = 'd', long)]
    pub data: Option<String>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Absolute URL, or a path resolved against the configured origin
    pub url: String,
}

/// Parse a "Name: value" header.
fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid header '{s}': expected \"Name: value\""))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header '{s}': empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_valid() {
        let (k, v) = parse_header("Content-Type: application/json").unwrap();
        assert_eq!(k, "Content-Type");
        assert_eq!(v, "application/json");
    }

    #[test]
    fn parse_header_keeps_colons_in_value() {
        let (k, v) = parse_header("Referer: https://app.test/").unwrap();
        assert_eq!(k, "Referer");
        assert_eq!(v, "https://app.test/");
    }

    #[test]
    fn parse_header_invalid() {
        assert!(parse_header("Content-Type").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from([
            "transit",
            "fetch",
            "/api/convert",
            "-X",
            "POST",
            "-H",
            "content-type: application/json",
            "-d",
            "{}",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "/api/convert");
                assert_eq!(args.method, "POST");
                assert_eq!(args.headers, vec![("content-type".to_string(), "application/json".to_string())]);
                assert_eq!(args.data.as_deref(), Some("{}"));
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn cli_fetch_defaults_to_get() {
        let cli = Cli::parse_from(["transit", "fetch", "/"]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.method, "GET");
                assert!(args.headers.is_empty());
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_verbosity() {
        let cli = Cli::parse_from(["transit", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status));
    }
}

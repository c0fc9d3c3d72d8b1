//! subsite-router
//!
//! Serves a config-declared route table over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::dispatch ──▶ handler registry
//!                          │                  │
//!                          │            RouteTable (root)
//!                          │              ├─ handler rows
//!                          │              └─ mount rows ──▶ RouteTable (subsite)
//!                          ▼
//!     Client Response ◀── 200 / 404 / 405
//!
//!     config file ──▶ watcher ──▶ compile ──▶ ArcSwap (live table)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use subsite_router::config::watcher::ConfigWatcher;
use subsite_router::http::{HandlerRegistry, HttpServer};
use subsite_router::lifecycle::{self, signals, Shutdown};

#[derive(Parser)]
#[command(name = "subsite-router")]
#[command(about = "Dispatch HTTP requests through a typed route table", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    /// Reload routes when the configuration file changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prepared = lifecycle::prepare(&args.config).await?;
    tracing::info!("subsite-router v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    // The watcher stops when dropped, so keep it alive until shutdown.
    let (_watcher, updates) = if args.watch {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let server = HttpServer::new(&prepared.config, prepared.table, HandlerRegistry::new());
    server
        .run(prepared.listener, updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

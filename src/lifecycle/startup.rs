//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Compile the root route table
//! - Bind the listener last, once routes are ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, RouterConfig};
use crate::observability::{logging, metrics};
use crate::routing::{compile_routing, HandlerName, RouteTable};

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to start serving.
#[derive(Debug)]
pub struct Prepared {
    pub config: RouterConfig,
    pub table: Arc<RouteTable<HandlerName>>,
    pub listener: TcpListener,
}

impl Prepared {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }
}

/// Load `path` and bring up every subsystem ahead of the server.
pub async fn prepare(path: &Path) -> Result<Prepared, StartupError> {
    let config = load_config(path)?;
    logging::init(&config.observability);

    tracing::info!(
        config = ?path,
        bind_address = %config.listener.bind_address,
        root = %config.routing.root,
        sites = config.routing.sites.len(),
        "Configuration loaded"
    );

    prepare_with(config).await
}

/// Same as [`prepare`] for an already loaded config. Logging is left alone.
pub async fn prepare_with(config: RouterConfig) -> Result<Prepared, StartupError> {
    if config.observability.metrics_enabled {
        // Validation already checked the address.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let table = compile_routing(&config.routing)?;
    tracing::debug!(table = %table, "Root route table");

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    Ok(Prepared {
        config,
        table,
        listener,
    })
}

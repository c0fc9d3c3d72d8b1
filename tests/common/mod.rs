//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use subsite_router::config::{parse_config, RouterConfig};
use subsite_router::http::{HandlerRegistry, HttpServer};
use subsite_router::lifecycle::Shutdown;
use subsite_router::routing::{compile_routing, HandlerName, RouteTable};

pub const SCENARIO: &str = include_str!("../../demos/scenario.toml");

/// The demo scenario config, bound to an ephemeral local port.
pub fn scenario_config() -> RouterConfig {
    let mut config = parse_config(SCENARIO).unwrap();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

pub fn scenario_table() -> Arc<RouteTable<HandlerName>> {
    compile_routing(&scenario_config().routing).unwrap()
}

/// A running server plus the handles a test needs to drive it.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
    pub updates: mpsc::UnboundedSender<RouterConfig>,
    pub task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server for `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: RouterConfig, handlers: HandlerRegistry) -> RunningServer {
    let table = compile_routing(&config.routing).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let (updates, rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(&config, table, handlers);
    let task = tokio::spawn(server.run(listener, rx, shutdown.subscribe()));

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningServer {
        addr,
        shutdown,
        updates,
        task,
    }
}

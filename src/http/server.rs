//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create an Axum Router whose catch-all feeds the route table
//! - Wire up middleware (request ID, tracing, timeout)
//! - Map dispatch outcomes to responses or handler calls
//! - Swap in recompiled route tables on config reload
//! - Record dispatch metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::handlers::{HandlerCall, HandlerRegistry};
use crate::http::request::{split_uri, RequestEnv, X_REQUEST_ID};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::compile::{compile_routing, HandlerName};
use crate::routing::{dispatch, DispatchOutcome, DispatchRequest, RouteTable, Site};

/// The live root table. Replaced whole on reload, never mutated.
pub type SharedTable = Arc<ArcSwap<RouteTable<HandlerName>>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: SharedTable,
    pub handlers: Arc<HandlerRegistry>,
}

/// HTTP front end for a compiled route table.
pub struct HttpServer {
    router: Router,
    table: SharedTable,
}

impl HttpServer {
    pub fn new(config: &RouterConfig, table: Arc<RouteTable<HandlerName>>, handlers: HandlerRegistry) -> Self {
        let table: SharedTable = Arc::new(ArcSwap::new(table));
        let state = AppState {
            table: table.clone(),
            handlers: Arc::new(handlers),
        };
        let router = Self::build_router(config, state);
        Self { router, table }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live table.
    pub fn table(&self) -> SharedTable {
        self.table.clone()
    }

    /// Serve until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reloader = tokio::spawn(apply_updates(self.table.clone(), config_updates));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Recompile and swap the table for every validated config update.
async fn apply_updates(table: SharedTable, mut updates: mpsc::UnboundedReceiver<RouterConfig>) {
    while let Some(config) = updates.recv().await {
        match compile_routing(&config.routing) {
            Ok(compiled) => {
                let site = compiled.name().to_string();
                table.store(compiled);
                metrics::record_reload(&site);
                tracing::info!(site = %site, "Route table reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Reloaded config did not compile; keeping current routes");
            }
        }
    }
}

/// Catch-all handler: dispatch through the live table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let table = state.table.load_full();

    let Some((path, query)) = split_uri(request.uri()) else {
        metrics::record_dispatch(table.name(), "not_found", start);
        tracing::warn!(path = %request.uri().path(), "Path is not valid UTF-8 once decoded");
        return response::not_found();
    };
    let dispatch_request = DispatchRequest {
        path,
        method: request.method().clone(),
        query,
        env: RequestEnv::from_headers(request.headers()),
    };

    let outcome = dispatch(table.as_ref(), &dispatch_request);
    metrics::record_dispatch(table.name(), outcome.label(), start);

    let request_id = &dispatch_request.env.request_id;
    match outcome {
        DispatchOutcome::Matched(matched) => {
            tracing::debug!(
                request_id = %request_id,
                method = %dispatch_request.method,
                route = %matched.route,
                handler = %matched.handler,
                "Route matched"
            );
            let canonical_url = table.render(&matched.route).ok().map(|r| r.to_uri_string());
            state.handlers.call(HandlerCall {
                handler: matched.handler,
                method: &dispatch_request.method,
                route: &matched.route,
                env: matched.env,
                canonical_url,
            })
        }
        DispatchOutcome::MethodNotAllowed { allowed } => {
            tracing::debug!(
                request_id = %request_id,
                method = %dispatch_request.method,
                path = %request.uri().path(),
                "Method not allowed"
            );
            response::method_not_allowed(&allowed)
        }
        DispatchOutcome::NotFound => {
            tracing::warn!(request_id = %request_id, path = %request.uri().path(), "No route matched");
            response::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let table = RouteTable::builder("App")
            .route("OnlyGetR", "/only-get", Method::GET, "only_get".to_string())
            .route("HasParamR", "/has-param/#Int", Method::GET, "has_param".to_string())
            .route("FilesR", "/files/*Text", Method::GET, "files".to_string())
            .build()
            .unwrap();
        HttpServer::new(&RouterConfig::default(), Arc::new(table), HandlerRegistry::new())
    }

    async fn send(router: Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_outcomes_map_to_statuses() {
        let router = server().router();

        let response = send(router.clone(), Method::GET, "/has-param/42").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let response = send(router.clone(), Method::POST, "/only-get").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");

        let response = send(router.clone(), Method::GET, "/has-param/abc").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(router, Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_undecodable_segment_is_not_found() {
        let router = server().router();

        let response = send(router.clone(), Method::GET, "/files/%FF").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(router, Method::GET, "/files/%C3%A9").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_swaps_table() {
        let server = server();
        let shared = server.table();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(apply_updates(shared.clone(), rx));

        let config: RouterConfig = toml::from_str(
            r#"
            [routing]
            root = "Next"
            [[routing.sites]]
            name = "Next"
            routes = [{ name = "HomeR", pattern = "/" }]
            "#,
        )
        .unwrap();
        tx.send(config).unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(shared.load().name(), "Next");
        let response = send(server.router(), Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

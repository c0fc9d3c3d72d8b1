//! HTTP adapter over the route table.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → request.rs (split path, parse query, capture request env)
//!     → routing::dispatch (pure, against the live table)
//!     → handlers.rs (matched) | response.rs (404 / 405)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::{describe_route, Handler, HandlerCall, HandlerRegistry};
pub use request::{split_path, split_uri, RequestEnv, X_REQUEST_ID};
pub use server::{AppState, HttpServer, SharedTable};

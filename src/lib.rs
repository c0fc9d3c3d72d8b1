//! Typed route dispatch with mountable subsites.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::{HandlerRegistry, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{
    dispatch, DispatchOutcome, DispatchRequest, MethodSet, ParamValue, Route, RouteTable, Site,
};

//! Handler execution after a successful match.
//!
//! The router only names a handler; this registry turns the name into a
//! response. Unregistered names fall back to [`describe_route`], which
//! reports what matched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::http::request::RequestEnv;
use crate::routing::Route;

/// Everything a handler receives for one matched request.
#[derive(Debug)]
pub struct HandlerCall<'a> {
    pub handler: &'a str,
    pub method: &'a Method,
    pub route: &'a Route,
    pub env: &'a RequestEnv,
    /// Canonical URL re-rendered from `route`.
    pub canonical_url: Option<String>,
}

/// A request handler.
pub trait Handler: Send + Sync {
    fn call(&self, call: HandlerCall<'_>) -> Response;
}

impl<F> Handler for F
where
    F: Fn(HandlerCall<'_>) -> Response + Send + Sync,
{
    fn call(&self, call: HandlerCall<'_>) -> Response {
        self(call)
    }
}

/// Handlers by name.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
    fallback: Arc<dyn Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Arc::new(describe_route),
        }
    }

    pub fn register(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Handler used for names without a registration.
    pub fn with_fallback(mut self, handler: impl Handler + 'static) -> Self {
        self.fallback = Arc::new(handler);
        self
    }

    pub fn call(&self, call: HandlerCall<'_>) -> Response {
        match self.handlers.get(call.handler) {
            Some(handler) => handler.call(call),
            None => self.fallback.call(call),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

/// JSON description of the matched route.
pub fn describe_route(call: HandlerCall<'_>) -> Response {
    Json(json!({
        "handler": call.handler,
        "method": call.method.as_str(),
        "variant": call.route.variant_path(),
        "route": call.route,
        "canonical_url": call.canonical_url,
        "request_id": call.env.request_id,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};

    fn env() -> RequestEnv {
        RequestEnv {
            request_id: "req-1".into(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_registered_handler_wins() {
        let registry = HandlerRegistry::new()
            .register("teapot", |_: HandlerCall<'_>| StatusCode::IM_A_TEAPOT.into_response());
        let route = Route::leaf("TeaR", vec![]);
        let env = env();

        let response = registry.call(HandlerCall {
            handler: "teapot",
            method: &Method::GET,
            route: &route,
            env: &env,
            canonical_url: None,
        });
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        let response = registry.call(HandlerCall {
            handler: "other",
            method: &Method::GET,
            route: &route,
            env: &env,
            canonical_url: None,
        });
        assert_eq!(response.status(), StatusCode::OK);
    }
}

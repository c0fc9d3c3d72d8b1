//! Response mapping for non-matching dispatch outcomes.
//!
//! # Design Decisions
//! - `NotFound` → 404, `MethodNotAllowed` → 405 with an `Allow` header
//! - The router never builds these itself; this adapter does

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}

pub fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

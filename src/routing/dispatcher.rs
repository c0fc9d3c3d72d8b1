//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve a [`DispatchRequest`] against a compiled site
//! - Attach the request query to the matched leaf route
//! - Hand the environment back untouched for the handler collaborator
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared mutable state, no logging
//! - Bounded work: table size × path length, recursion bounded by mount depth

use axum::http::Method;

use crate::routing::route::{Query, Route};
use crate::routing::site::{Resolution, Site};

/// One request to dispatch. `env` is opaque to the router.
#[derive(Debug, Clone)]
pub struct DispatchRequest<E> {
    pub path: Vec<String>,
    pub method: Method,
    pub query: Query,
    pub env: E,
}

impl<E> DispatchRequest<E> {
    pub fn new<I, S>(method: Method, path: I, env: E) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            method,
            query: Query::new(),
            env,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}

/// A successful match, ready to hand to the handler collaborator.
#[derive(Debug)]
pub struct Matched<'s, 'r, H, E> {
    pub handler: &'s H,
    pub route: Route,
    pub env: &'r E,
}

/// Result of [`dispatch`].
#[derive(Debug)]
pub enum DispatchOutcome<'s, 'r, H, E> {
    Matched(Matched<'s, 'r, H, E>),
    /// A row matched structurally but excludes the method; `allowed` lists its methods.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

impl<'s, 'r, H, E> DispatchOutcome<'s, 'r, H, E> {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Matched(_) => "matched",
            DispatchOutcome::MethodNotAllowed { .. } => "method_not_allowed",
            DispatchOutcome::NotFound => "not_found",
        }
    }

    pub fn into_matched(self) -> Option<Matched<'s, 'r, H, E>> {
        match self {
            DispatchOutcome::Matched(matched) => Some(matched),
            _ => None,
        }
    }
}

/// Dispatch `request` against `site`.
pub fn dispatch<'s, 'r, H, E, S>(site: &'s S, request: &'r DispatchRequest<E>) -> DispatchOutcome<'s, 'r, H, E>
where
    S: Site<H> + ?Sized,
{
    match site.resolve(&request.path, &request.method) {
        Resolution::Matched { handler, mut route } => {
            route.set_query(request.query.clone());
            DispatchOutcome::Matched(Matched {
                handler,
                route,
                env: &request.env,
            })
        }
        Resolution::MethodNotAllowed { allowed } => DispatchOutcome::MethodNotAllowed { allowed },
        Resolution::NotFound => DispatchOutcome::NotFound,
    }
}

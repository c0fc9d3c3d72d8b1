//! The dispatch/render contract shared by every site.
//!
//! A parent table only ever sees a mounted subsite through this trait, so a
//! subsite can be any implementation that honours the same contract.

use std::fmt;

use axum::http::Method;

use crate::routing::error::RenderError;
use crate::routing::route::{RenderedRoute, Route};

/// Result of resolving a path inside one site.
#[derive(Debug, PartialEq)]
pub enum Resolution<'s, H> {
    Matched { handler: &'s H, route: Route },
    /// The first structurally-matching row excludes the request method.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// A compiled site: something that can be dispatched into and rendered from.
pub trait Site<H>: Send + Sync + fmt::Debug {
    /// Site name, as referenced by `@Name` mount segments.
    fn name(&self) -> &str;

    /// Resolve `path` (already stripped of any parent prefix) for `method`.
    fn resolve(&self, path: &[String], method: &Method) -> Resolution<'_, H>;

    /// Render a route value of this site back into path segments and query.
    fn render(&self, route: &Route) -> Result<RenderedRoute, RenderError>;

    /// Build a route value from a variant path (`["MountR", "LeafR"]`) and
    /// raw, unparsed capture values listed outermost first.
    fn build_route(&self, variant: &[&str], raw: &[&str]) -> Result<Route, RenderError>;

    /// Write an indented listing of this site's rows.
    fn write_tree(&self, out: &mut dyn fmt::Write, depth: usize) -> fmt::Result;
}

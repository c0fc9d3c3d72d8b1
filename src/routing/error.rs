//! Routing error types.
//!
//! Dispatch has no error type: `NotFound` and `MethodNotAllowed` are ordinary
//! outcomes. Errors only arise while building a table (startup) or while
//! rendering a route value that does not belong to the table.

use crate::routing::param::ParamType;
use crate::routing::pattern::PatternError;

/// Table construction failure. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("site `{site}`, route `{route}`: {source}")]
    Pattern {
        site: String,
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("site `{site}` declares route `{route}` more than once")]
    DuplicateRoute { site: String, route: String },

    #[error("site `{site}`, route `{route}`: pattern `{pattern}` ends in a mount point, use `mount`")]
    UnexpectedMount {
        site: String,
        route: String,
        pattern: String,
    },

    #[error("site `{site}`, route `{route}`: pattern `{pattern}` must end in `@{expected}`")]
    MountMismatch {
        site: String,
        route: String,
        pattern: String,
        expected: String,
    },
}

/// A route value that cannot be rendered by (or built for) a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("site `{site}` has no route named `{route}`")]
    UnknownRoute { site: String, route: String },

    #[error("route `{route}` expects {expected} parameter(s), got {actual}")]
    ParamCount {
        route: String,
        expected: usize,
        actual: usize,
    },

    #[error("route `{route}`: parameter {position} must be {expected}, got `{value}`")]
    ParamType {
        route: String,
        position: usize,
        expected: ParamType,
        value: String,
    },

    #[error("route `{route}` is a {declared} row but the value is a {actual} route")]
    TargetMismatch {
        route: String,
        declared: &'static str,
        actual: &'static str,
    },

    #[error("an empty variant path names no route")]
    EmptyVariant,
}

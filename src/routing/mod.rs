//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path segments, query, env)
//!     → dispatcher.rs (entry point)
//!     → table.rs (first structural match, in declaration order)
//!         → pattern.rs (literal / capture / rest-consuming segments)
//!         → param.rs (typed capture parsing)
//!         → mount row? re-enter the mounted Site with the suffix
//!     → Return: Matched(handler, Route) | MethodNotAllowed | NotFound
//!
//! Table compilation (at startup):
//!     route declarations (builder or config)
//!     → parse patterns, check names and mounts
//!     → overlap.rs (warn about overlapping rows)
//!     → Freeze as immutable RouteTable
//!
//! Rendering:
//!     Route → table.rs (literal + rendered captures, recurse into mounts)
//!     → RenderedRoute (segments, query)
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - First structural match wins; the method is checked only on that row
//! - Capture parse failure is a non-match, never an error
//! - Subsites are opaque `Site` trait objects

pub mod compile;
pub mod dispatcher;
pub mod error;
pub mod overlap;
pub mod param;
pub mod pattern;
pub mod route;
pub mod site;
pub mod table;

pub use compile::{compile_routing, HandlerName};
pub use dispatcher::{dispatch, DispatchOutcome, DispatchRequest, Matched};
pub use error::{BuildError, RenderError};
pub use param::{ParamType, ParamValue};
pub use pattern::{PatternError, RoutePattern, Segment};
pub use route::{Query, RenderedRoute, Route, RouteTarget};
pub use site::{Resolution, Site};
pub use table::{EntryKind, MethodSet, RouteEntry, RouteTable, RouteTableBuilder};

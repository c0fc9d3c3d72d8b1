//! Compiled route tables.
//!
//! # Responsibilities
//! - Store rows in declaration order
//! - Resolve a path to the first structurally-matching row
//! - Delegate mount rows to the mounted site with the unconsumed suffix
//! - Render route values back to paths
//!
//! # Design Decisions
//! - Immutable after construction (shared across threads without locks)
//! - First structural match wins, independent of method
//! - A matching mount row is final: the subsite's answer is the answer

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::error::{BuildError, RenderError};
use crate::routing::overlap::find_overlaps;
use crate::routing::param::{ParamType, ParamValue};
use crate::routing::pattern::{RoutePattern, Segment};
use crate::routing::route::{Query, RenderedRoute, Route, RouteTarget};
use crate::routing::site::{Resolution, Site};

/// Methods accepted by a handler row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(Vec<Method>),
}

impl MethodSet {
    /// An explicit set. An empty list means any method.
    pub fn only<I: IntoIterator<Item = Method>>(methods: I) -> Self {
        let mut list: Vec<Method> = Vec::new();
        for method in methods {
            if !list.contains(&method) {
                list.push(method);
            }
        }
        if list.is_empty() {
            MethodSet::Any
        } else {
            MethodSet::Only(list)
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(list) => list.contains(method),
        }
    }

    pub fn methods(&self) -> &[Method] {
        match self {
            MethodSet::Any => &[],
            MethodSet::Only(list) => list,
        }
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::Only(vec![method])
    }
}

impl<const N: usize> From<[Method; N]> for MethodSet {
    fn from(methods: [Method; N]) -> Self {
        MethodSet::only(methods)
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => f.write_str("ANY"),
            MethodSet::Only(list) => {
                for (i, method) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(method.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// What a row dispatches to.
#[derive(Debug)]
pub enum EntryKind<H> {
    Handler { methods: MethodSet, handler: H },
    Mount(Arc<dyn Site<H>>),
}

/// One row of a route table.
#[derive(Debug)]
pub struct RouteEntry<H> {
    name: String,
    pattern: RoutePattern,
    kind: EntryKind<H>,
}

impl<H> RouteEntry<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn kind(&self) -> &EntryKind<H> {
        &self.kind
    }
}

/// An ordered, immutable route table for one site.
#[derive(Debug)]
pub struct RouteTable<H> {
    site: String,
    entries: Vec<RouteEntry<H>>,
}

impl<H> RouteTable<H> {
    pub fn builder(site: impl Into<String>) -> RouteTableBuilder<H> {
        RouteTableBuilder {
            site: site.into(),
            entries: Vec::new(),
            names: HashSet::new(),
            error: None,
        }
    }

    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    fn entry(&self, name: &str) -> Option<&RouteEntry<H>> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn unknown(&self, route: &str) -> RenderError {
        RenderError::UnknownRoute {
            site: self.site.clone(),
            route: route.to_string(),
        }
    }
}

impl<H> Site<H> for RouteTable<H>
where
    H: fmt::Debug + Send + Sync,
{
    fn name(&self) -> &str {
        &self.site
    }

    fn resolve(&self, path: &[String], method: &Method) -> Resolution<'_, H> {
        for entry in &self.entries {
            let Some(matched) = entry.pattern.match_path(path) else {
                continue;
            };

            return match &entry.kind {
                EntryKind::Mount(site) => match site.resolve(matched.rest, method) {
                    Resolution::Matched { handler, route } => Resolution::Matched {
                        handler,
                        route: Route::mount(entry.name.clone(), matched.params, route),
                    },
                    other => other,
                },
                EntryKind::Handler { methods, handler } if methods.allows(method) => {
                    Resolution::Matched {
                        handler,
                        route: Route::leaf(entry.name.clone(), matched.params),
                    }
                }
                EntryKind::Handler { methods, .. } => Resolution::MethodNotAllowed {
                    allowed: methods.methods().to_vec(),
                },
            };
        }
        Resolution::NotFound
    }

    fn render(&self, route: &Route) -> Result<RenderedRoute, RenderError> {
        let entry = self.entry(route.name()).ok_or_else(|| self.unknown(route.name()))?;
        check_params(entry, route.params())?;

        let mut params = route.params().iter();
        let mut segments = Vec::new();
        for segment in entry.pattern.segments() {
            match segment {
                Segment::Literal(s) => segments.push(s.clone()),
                Segment::Capture(_) | Segment::Multi(_) => {
                    if let Some(value) = params.next() {
                        segments.extend(value.to_segments());
                    }
                }
                Segment::Mount(_) => {}
            }
        }

        let query = match (&entry.kind, route.target()) {
            (EntryKind::Mount(site), RouteTarget::Mount(inner)) => {
                let nested = site.render(inner)?;
                segments.extend(nested.segments);
                nested.query
            }
            (EntryKind::Handler { .. }, RouteTarget::Leaf { query }) => query.clone(),
            (kind, target) => return Err(target_mismatch(&entry.name, kind, target)),
        };

        Ok(RenderedRoute { segments, query })
    }

    fn build_route(&self, variant: &[&str], raw: &[&str]) -> Result<Route, RenderError> {
        let (name, nested_variant) = variant.split_first().ok_or(RenderError::EmptyVariant)?;
        let entry = self.entry(name).ok_or_else(|| self.unknown(name))?;

        let mut params = Vec::new();
        let mut consumed = 0;
        for (param_type, multi) in entry.pattern.captures() {
            if multi {
                let items = raw[consumed..]
                    .iter()
                    .enumerate()
                    .map(|(i, s)| parse_raw(name, consumed + i, param_type, s))
                    .collect::<Result<Vec<_>, _>>()?;
                consumed = raw.len();
                params.push(ParamValue::List(items));
            } else {
                let s = raw.get(consumed).ok_or_else(|| RenderError::ParamCount {
                    route: name.to_string(),
                    expected: consumed + 1,
                    actual: raw.len(),
                })?;
                params.push(parse_raw(name, consumed, param_type, s)?);
                consumed += 1;
            }
        }

        match &entry.kind {
            EntryKind::Mount(site) => {
                let inner = site.build_route(nested_variant, &raw[consumed..])?;
                Ok(Route::mount(*name, params, inner))
            }
            EntryKind::Handler { .. } if !nested_variant.is_empty() => {
                Err(RenderError::TargetMismatch {
                    route: name.to_string(),
                    declared: "handler",
                    actual: "mount",
                })
            }
            EntryKind::Handler { .. } if consumed != raw.len() => Err(RenderError::ParamCount {
                route: name.to_string(),
                expected: consumed,
                actual: raw.len(),
            }),
            EntryKind::Handler { .. } => Ok(Route::leaf(*name, params)),
        }
    }

    fn write_tree(&self, out: &mut dyn fmt::Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for entry in &self.entries {
            match &entry.kind {
                EntryKind::Handler { methods, .. } => {
                    writeln!(out, "{}{} {} [{}]", indent, entry.pattern, entry.name, methods)?;
                }
                EntryKind::Mount(site) => {
                    writeln!(out, "{}{} {}", indent, entry.pattern, entry.name)?;
                    site.write_tree(out, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl<H> fmt::Display for RouteTable<H>
where
    H: fmt::Debug + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.site)?;
        self.write_tree(f, 1)
    }
}

fn parse_raw(route: &str, position: usize, expected: ParamType, raw: &str) -> Result<ParamValue, RenderError> {
    expected.parse(raw).ok_or_else(|| RenderError::ParamType {
        route: route.to_string(),
        position,
        expected,
        value: raw.to_string(),
    })
}

fn check_params<H>(entry: &RouteEntry<H>, params: &[ParamValue]) -> Result<(), RenderError> {
    let captures: Vec<_> = entry.pattern.captures().collect();
    if captures.len() != params.len() {
        return Err(RenderError::ParamCount {
            route: entry.name.clone(),
            expected: captures.len(),
            actual: params.len(),
        });
    }

    for (position, ((expected, multi), value)) in captures.into_iter().zip(params).enumerate() {
        let admitted = match value {
            ParamValue::List(items) if multi => items.iter().all(|v| expected.admits(v)),
            _ if multi => false,
            single => expected.admits(single),
        };
        if !admitted {
            return Err(RenderError::ParamType {
                route: entry.name.clone(),
                position,
                expected,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn target_mismatch<H>(route: &str, kind: &EntryKind<H>, target: &RouteTarget) -> RenderError {
    let declared = match kind {
        EntryKind::Handler { .. } => "handler",
        EntryKind::Mount(_) => "mount",
    };
    let actual = match target {
        RouteTarget::Leaf { .. } => "handler",
        RouteTarget::Mount(_) => "mount",
    };
    RenderError::TargetMismatch {
        route: route.to_string(),
        declared,
        actual,
    }
}

/// Incremental construction of a [`RouteTable`].
///
/// The first error is kept and reported by [`RouteTableBuilder::build`].
pub struct RouteTableBuilder<H> {
    site: String,
    entries: Vec<RouteEntry<H>>,
    names: HashSet<String>,
    error: Option<BuildError>,
}

impl<H> RouteTableBuilder<H>
where
    H: fmt::Debug + Send + Sync,
{
    /// Add a handler row.
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        methods: impl Into<MethodSet>,
        handler: H,
    ) -> Self {
        let name = name.into();
        let Some(pattern) = self.parse(&name, pattern) else {
            return self;
        };
        if pattern.mount().is_some() {
            let error = BuildError::UnexpectedMount {
                site: self.site.clone(),
                route: name,
                pattern: pattern.to_string(),
            };
            self.fail(error);
            return self;
        }
        let kind = EntryKind::Handler {
            methods: methods.into(),
            handler,
        };
        self.push(name, pattern, kind);
        self
    }

    /// Add a mount row. The pattern must end in `@<subsite name>`.
    pub fn mount(mut self, name: impl Into<String>, pattern: &str, subsite: Arc<dyn Site<H>>) -> Self {
        let name = name.into();
        let Some(pattern) = self.parse(&name, pattern) else {
            return self;
        };
        if pattern.mount() != Some(subsite.name()) {
            let error = BuildError::MountMismatch {
                site: self.site.clone(),
                route: name,
                pattern: pattern.to_string(),
                expected: subsite.name().to_string(),
            };
            self.fail(error);
            return self;
        }
        self.push(name, pattern, EntryKind::Mount(subsite));
        self
    }

    pub fn build(self) -> Result<RouteTable<H>, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let table = RouteTable {
            site: self.site,
            entries: self.entries,
        };

        for overlap in find_overlaps(table.entries.iter().map(|e| (e.name.as_str(), &e.pattern))) {
            tracing::warn!(
                site = %table.site,
                earlier = %overlap.earlier,
                later = %overlap.later,
                "Routes overlap; the earlier declaration wins where both match"
            );
        }

        tracing::debug!(site = %table.site, routes = table.entries.len(), "Route table compiled");
        Ok(table)
    }

    fn parse(&mut self, name: &str, pattern: &str) -> Option<RoutePattern> {
        match RoutePattern::parse(pattern) {
            Ok(pattern) => Some(pattern),
            Err(source) => {
                let error = BuildError::Pattern {
                    site: self.site.clone(),
                    route: name.to_string(),
                    source,
                };
                self.fail(error);
                None
            }
        }
    }

    fn push(&mut self, name: String, pattern: RoutePattern, kind: EntryKind<H>) {
        if !self.names.insert(name.clone()) {
            let error = BuildError::DuplicateRoute {
                site: self.site.clone(),
                route: name,
            };
            self.fail(error);
            return;
        }
        self.entries.push(RouteEntry { name, pattern, kind });
    }

    fn fail(&mut self, error: BuildError) {
        self.error.get_or_insert(error);
    }
}

//! Route values and their rendered form.
//!
//! A [`Route`] is the value-level mirror of one row in a route table: the
//! row's name is the variant tag, the decoded captures are its fields, and a
//! mount row nests the subsite's own route value.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::routing::param::ParamValue;

/// Query parameters attached to a route.
pub type Query = BTreeMap<String, String>;

/// A typed route value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    name: String,
    params: Vec<ParamValue>,
    target: RouteTarget,
}

/// What a route points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    /// A handler row. Query parameters always live here.
    Leaf { query: Query },
    /// A mount row wrapping the subsite's route.
    Mount(Box<Route>),
}

impl Route {
    /// A route to a handler row.
    pub fn leaf(name: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            params,
            target: RouteTarget::Leaf {
                query: Query::new(),
            },
        }
    }

    /// A route through a mount row, wrapping the subsite's route.
    pub fn mount(name: impl Into<String>, params: Vec<ParamValue>, inner: Route) -> Self {
        Self {
            name: name.into(),
            params,
            target: RouteTarget::Mount(Box::new(inner)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    /// The wrapped subsite route, if this is a mount route.
    pub fn inner(&self) -> Option<&Route> {
        match &self.target {
            RouteTarget::Mount(inner) => Some(inner),
            RouteTarget::Leaf { .. } => None,
        }
    }

    /// The innermost route.
    pub fn leaf_route(&self) -> &Route {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// Query parameters of the innermost route.
    pub fn query(&self) -> &Query {
        match &self.target {
            RouteTarget::Leaf { query } => query,
            RouteTarget::Mount(inner) => inner.query(),
        }
    }

    /// Attach query parameters. On a mount route they are pushed down to the leaf.
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.leaf_query_mut()
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub(crate) fn set_query(&mut self, query: Query) {
        *self.leaf_query_mut() = query;
    }

    fn leaf_query_mut(&mut self) -> &mut Query {
        match &mut self.target {
            RouteTarget::Leaf { query } => query,
            RouteTarget::Mount(inner) => inner.leaf_query_mut(),
        }
    }

    /// Dotted variant path, e.g. `MySubsiteR.SubHomeR`.
    pub fn variant_path(&self) -> String {
        match self.inner() {
            Some(inner) => format!("{}.{}", self.name, inner.variant_path()),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        if let Some(inner) = self.inner() {
            write!(f, " ({})", inner)?;
        }
        Ok(())
    }
}

/// Output of rendering a route: path segments plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRoute {
    pub segments: Vec<String>,
    pub query: Query,
}

// Everything outside RFC 3986 `pchar`.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

impl RenderedRoute {
    /// Percent-encoded path plus form-encoded query.
    pub fn to_uri_string(&self) -> String {
        let mut out = String::new();
        if self.segments.is_empty() {
            out.push('/');
        }
        for segment in &self.segments {
            out.push('/');
            out.extend(utf8_percent_encode(segment, SEGMENT));
        }
        if !self.query.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            out.push('?');
            out.push_str(&query);
        }
        out
    }
}

impl fmt::Display for RenderedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_pushed_to_leaf() {
        let route = Route::mount("SubR", vec![], Route::leaf("HomeR", vec![]))
            .with_query([("page", "2")]);

        assert_eq!(route.query().get("page").map(String::as_str), Some("2"));
        match route.target() {
            RouteTarget::Mount(inner) => assert_eq!(inner.query().len(), 1),
            RouteTarget::Leaf { .. } => panic!("expected mount"),
        }
    }

    #[test]
    fn test_variant_path() {
        let route = Route::mount("SubR", vec![], Route::leaf("HomeR", vec![]));
        assert_eq!(route.variant_path(), "SubR.HomeR");
        assert_eq!(route.leaf_route().name(), "HomeR");
    }

    #[test]
    fn test_uri_string_encodes_segments() {
        let rendered = RenderedRoute {
            segments: vec!["files".into(), "a b/c".into()],
            query: Query::from([("q".to_string(), "x y".to_string())]),
        };
        assert_eq!(rendered.to_uri_string(), "/files/a%20b%2Fc?q=x+y");

        let root = RenderedRoute {
            segments: vec![],
            query: Query::new(),
        };
        assert_eq!(root.to_uri_string(), "/");
    }

    #[test]
    fn test_display() {
        let route = Route::mount(
            "SubR",
            vec![],
            Route::leaf("ItemR", vec![ParamValue::Int(3)]),
        );
        assert_eq!(route.to_string(), "SubR (ItemR 3)");
    }
}

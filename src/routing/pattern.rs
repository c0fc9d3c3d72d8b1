//! Path patterns and structural matching.
//!
//! # Grammar
//! ```text
//! /                     empty pattern (matches the empty path)
//! /users/#Int           literal segment, then one typed capture
//! /files/*Text          multi-segment capture, consumes the rest (last only)
//! /admin/@Admin         subsite mount, consumes the rest (last only)
//! ```
//!
//! # Design Decisions
//! - Literals compare case-sensitively, byte for byte
//! - A capture that fails to parse is a structural mismatch
//! - Patterns are immutable once parsed; `Display` gives the canonical source

use std::fmt;

use crate::routing::param::{ParamType, ParamValue, UnknownParamType};

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Capture(ParamType),
    /// Typed capture over all remaining segments.
    Multi(ParamType),
    /// Subsite mount point, named after the mounted site.
    Mount(String),
}

impl Segment {
    fn is_terminal(&self) -> bool {
        matches!(self, Segment::Multi(_) | Segment::Mount(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Capture(t) => write!(f, "#{}", t),
            Segment::Multi(t) => write!(f, "*{}", t),
            Segment::Mount(site) => write!(f, "@{}", site),
        }
    }
}

/// Errors raised while parsing a pattern string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("pattern `{pattern}` has an empty segment at position {position}")]
    EmptySegment { pattern: String, position: usize },

    #[error("pattern `{pattern}`: `{sigil}` must be followed by a name")]
    MissingName { pattern: String, sigil: char },

    #[error("pattern `{pattern}`: {source}")]
    UnknownType {
        pattern: String,
        #[source]
        source: UnknownParamType,
    },

    #[error("pattern `{pattern}`: `{segment}` consumes the rest of the path and must be the last segment")]
    NotLast { pattern: String, segment: String },
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

/// Result of a successful structural match.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch<'p> {
    /// Decoded captures in declaration order.
    pub params: Vec<ParamValue>,
    /// Segments left for a mounted subsite. Always empty for non-mount patterns.
    pub rest: &'p [String],
}

impl RoutePattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let body = source
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(source.to_string()))?;

        if body.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let mut segments = Vec::new();
        for (position, raw) in body.split('/').enumerate() {
            if raw.is_empty() {
                return Err(PatternError::EmptySegment {
                    pattern: source.to_string(),
                    position,
                });
            }
            segments.push(parse_segment(source, raw)?);
        }

        let last = segments.len() - 1;
        if let Some(segment) = segments[..last].iter().find(|s| s.is_terminal()) {
            return Err(PatternError::NotLast {
                pattern: source.to_string(),
                segment: segment.to_string(),
            });
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Name of the mounted site, if this pattern ends in a mount point.
    pub fn mount(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Mount(site)) => Some(site),
            _ => None,
        }
    }

    /// Capture segments in order, as `(type, is_multi)`.
    pub fn captures(&self) -> impl Iterator<Item = (ParamType, bool)> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Capture(t) => Some((*t, false)),
            Segment::Multi(t) => Some((*t, true)),
            _ => None,
        })
    }

    /// Attempt a structural match against `path`.
    pub fn match_path<'p>(&self, path: &'p [String]) -> Option<PatternMatch<'p>> {
        let mut params = Vec::new();
        let mut cursor = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    if path.get(cursor)? != expected {
                        return None;
                    }
                    cursor += 1;
                }
                Segment::Capture(t) => {
                    params.push(t.parse(path.get(cursor)?)?);
                    cursor += 1;
                }
                Segment::Multi(t) => {
                    let items = path[cursor..]
                        .iter()
                        .map(|s| t.parse(s))
                        .collect::<Option<Vec<_>>>()?;
                    params.push(ParamValue::List(items));
                    return Some(PatternMatch { params, rest: &[] });
                }
                Segment::Mount(_) => {
                    return Some(PatternMatch {
                        params,
                        rest: &path[cursor..],
                    });
                }
            }
        }

        (cursor == path.len()).then_some(PatternMatch { params, rest: &[] })
    }
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, PatternError> {
    let Some(sigil) = raw.chars().next().filter(|c| matches!(c, '#' | '*' | '@')) else {
        return Ok(Segment::Literal(raw.to_string()));
    };

    let name = &raw[1..];
    if name.is_empty() {
        return Err(PatternError::MissingName {
            pattern: pattern.to_string(),
            sigil,
        });
    }

    if sigil == '@' {
        return Ok(Segment::Mount(name.to_string()));
    }

    let param_type = name
        .parse::<ParamType>()
        .map_err(|source| PatternError::UnknownType {
            pattern: pattern.to_string(),
            source,
        })?;

    Ok(if sigil == '#' {
        Segment::Capture(param_type)
    } else {
        Segment::Multi(param_type)
    })
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_and_display() {
        for source in ["/", "/only-get", "/has-param/#Int", "/files/*Text", "/my-subsite/@Sub"] {
            let pattern = RoutePattern::parse(source).unwrap();
            assert_eq!(pattern.to_string(), source);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RoutePattern::parse("nope"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            RoutePattern::parse("/a//b"),
            Err(PatternError::EmptySegment { position: 1, .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/"),
            Err(PatternError::EmptySegment { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/#"),
            Err(PatternError::MissingName { sigil: '#', .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/#Float"),
            Err(PatternError::UnknownType { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/@Sub/tail"),
            Err(PatternError::NotLast { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/*Text/tail"),
            Err(PatternError::NotLast { .. })
        ));
    }

    #[test]
    fn test_literal_match_is_case_sensitive() {
        let pattern = RoutePattern::parse("/only-get").unwrap();
        assert!(pattern.match_path(&path(&["only-get"])).is_some());
        assert!(pattern.match_path(&path(&["Only-Get"])).is_none());
        assert!(pattern.match_path(&path(&["only-get", "x"])).is_none());
        assert!(pattern.match_path(&path(&[])).is_none());
    }

    #[test]
    fn test_capture_parse_failure_is_mismatch() {
        let pattern = RoutePattern::parse("/has-param/#Int").unwrap();
        let segs = path(&["has-param", "42"]);
        let matched = pattern.match_path(&segs).unwrap();
        assert_eq!(matched.params, vec![ParamValue::Int(42)]);
        assert!(pattern.match_path(&path(&["has-param", "abc"])).is_none());
    }

    #[test]
    fn test_mount_consumes_rest() {
        let pattern = RoutePattern::parse("/my-subsite/@Sub").unwrap();
        let p = path(&["my-subsite", "x", "y"]);
        let matched = pattern.match_path(&p).unwrap();
        assert_eq!(matched.rest, &p[1..]);

        let p = path(&["my-subsite"]);
        let matched = pattern.match_path(&p).unwrap();
        assert!(matched.rest.is_empty());
        assert_eq!(pattern.mount(), Some("Sub"));
    }

    #[test]
    fn test_multi_capture() {
        let pattern = RoutePattern::parse("/sum/*Int").unwrap();
        let segs = path(&["sum", "1", "2"]);
        let matched = pattern.match_path(&segs).unwrap();
        assert_eq!(
            matched.params,
            vec![ParamValue::List(vec![ParamValue::Int(1), ParamValue::Int(2)])]
        );
        let segs = path(&["sum"]);
        let matched = pattern.match_path(&segs).unwrap();
        assert_eq!(matched.params, vec![ParamValue::List(vec![])]);
        assert!(pattern.match_path(&path(&["sum", "1", "x"])).is_none());
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_path() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.match_path(&path(&[])).is_some());
        assert!(pattern.match_path(&path(&["a"])).is_none());
    }
}

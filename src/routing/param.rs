//! Typed capture parameters.
//!
//! # Responsibilities
//! - Name the closed set of capture types usable in `#Type` / `*Type` segments
//! - Parse a raw path segment into a typed value
//! - Render a typed value back into a path segment
//!
//! # Design Decisions
//! - Parse failure is `None`, never an error: callers treat it as a non-match
//! - `Text` rejects the empty segment so every rendered value re-parses

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

/// Type tag of a capture segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamType {
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    UInt,
    /// Any non-empty segment.
    Text,
    /// `true` or `false`.
    Bool,
    /// Hyphenated UUID.
    Uuid,
}

impl ParamType {
    /// Parse `segment` under this type. `None` means "does not match".
    pub fn parse(self, segment: &str) -> Option<ParamValue> {
        match self {
            ParamType::Int => segment.parse().ok().map(ParamValue::Int),
            ParamType::UInt => segment.parse().ok().map(ParamValue::UInt),
            ParamType::Text if segment.is_empty() => None,
            ParamType::Text => Some(ParamValue::Text(segment.to_string())),
            ParamType::Bool => match segment {
                "true" => Some(ParamValue::Bool(true)),
                "false" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            ParamType::Uuid => Uuid::parse_str(segment).ok().map(ParamValue::Uuid),
        }
    }

    /// Whether `value` inhabits this type.
    pub fn admits(self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamType::Text, ParamValue::Text(s)) => !s.is_empty(),
            (ParamType::Text, _) => false,
            _ => value.param_type() == Some(self),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Int => "Int",
            ParamType::UInt => "UInt",
            ParamType::Text => "Text",
            ParamType::Bool => "Bool",
            ParamType::Uuid => "Uuid",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown capture type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capture type `{0}` (expected one of Int, UInt, Text, Bool, Uuid)")]
pub struct UnknownParamType(pub String);

impl FromStr for ParamType {
    type Err = UnknownParamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Int" => Ok(ParamType::Int),
            "UInt" => Ok(ParamType::UInt),
            "Text" => Ok(ParamType::Text),
            "Bool" => Ok(ParamType::Bool),
            "Uuid" => Ok(ParamType::Uuid),
            other => Err(UnknownParamType(other.to_string())),
        }
    }
}

/// A decoded capture value carried by a [`Route`](crate::routing::Route).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    UInt(u64),
    Text(String),
    Bool(bool),
    Uuid(Uuid),
    /// Values of a multi-segment `*Type` capture, in path order.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Type of a single-segment value; `None` for lists.
    pub fn param_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Int(_) => Some(ParamType::Int),
            ParamValue::UInt(_) => Some(ParamType::UInt),
            ParamValue::Text(_) => Some(ParamType::Text),
            ParamValue::Bool(_) => Some(ParamType::Bool),
            ParamValue::Uuid(_) => Some(ParamType::Uuid),
            ParamValue::List(_) => None,
        }
    }

    /// Render a single-segment value. Lists render through [`ParamValue::to_segments`].
    pub fn to_segment(&self) -> Option<String> {
        match self {
            ParamValue::Int(v) => Some(v.to_string()),
            ParamValue::UInt(v) => Some(v.to_string()),
            ParamValue::Text(v) => Some(v.clone()),
            ParamValue::Bool(v) => Some(v.to_string()),
            ParamValue::Uuid(v) => Some(v.hyphenated().to_string()),
            ParamValue::List(_) => None,
        }
    }

    /// Render into one segment per element, flattening lists one level.
    pub fn to_segments(&self) -> Vec<String> {
        match self {
            ParamValue::List(items) => items.iter().filter_map(ParamValue::to_segment).collect(),
            single => single.to_segment().into_iter().collect(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<Uuid> for ParamValue {
    fn from(v: Uuid) -> Self {
        ParamValue::Uuid(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            single => match single.to_segment() {
                Some(s) => f.write_str(&s),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_parse() {
        assert_eq!(ParamType::Int.parse("42"), Some(ParamValue::Int(42)));
        assert_eq!(ParamType::Int.parse("-7"), Some(ParamValue::Int(-7)));
        assert_eq!(ParamType::Int.parse("abc"), None);
        assert_eq!(ParamType::Int.parse(""), None);
        assert_eq!(ParamType::UInt.parse("-7"), None);
    }

    #[test]
    fn test_text_rejects_empty() {
        assert_eq!(ParamType::Text.parse("x"), Some(ParamValue::Text("x".into())));
        assert_eq!(ParamType::Text.parse(""), None);
        assert!(!ParamType::Text.admits(&ParamValue::Text(String::new())));
    }

    #[test]
    fn test_bool_is_case_sensitive() {
        assert_eq!(ParamType::Bool.parse("true"), Some(ParamValue::Bool(true)));
        assert_eq!(ParamType::Bool.parse("True"), None);
    }

    #[test]
    fn test_uuid_renders_hyphenated() {
        let id = Uuid::new_v4();
        let value = ParamType::Uuid.parse(&id.simple().to_string()).unwrap();
        assert_eq!(value.to_segment(), Some(id.hyphenated().to_string()));
    }

    #[test]
    fn test_type_names() {
        assert_eq!("Int".parse::<ParamType>(), Ok(ParamType::Int));
        assert!("int".parse::<ParamType>().is_err());
        assert_eq!(ParamType::Uuid.to_string(), "Uuid");
    }

    #[test]
    fn test_list_flattens() {
        let list = ParamValue::List(vec![ParamValue::Int(1), ParamValue::Int(2)]);
        assert_eq!(list.to_segments(), vec!["1", "2"]);
        assert_eq!(list.to_string(), "[1, 2]");
    }
}

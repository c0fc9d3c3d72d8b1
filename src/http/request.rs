//! Request handling and transformation.
//!
//! # Responsibilities
//! - Split the request target into decoded path segments and a query map
//! - Build the environment handed through dispatch to handlers
//!
//! # Design Decisions
//! - Split on `/` before percent-decoding, so `%2F` stays inside a segment
//! - A trailing slash yields a trailing empty segment (no implicit cleanup)
//! - A segment that does not decode to UTF-8 makes the whole path unroutable

use axum::http::{HeaderMap, Uri};
use percent_encoding::percent_decode_str;

use crate::routing::Query;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Per-request environment passed through dispatch unchanged.
#[derive(Debug, Clone)]
pub struct RequestEnv {
    pub request_id: String,
    pub headers: HeaderMap,
}

impl RequestEnv {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        Self {
            request_id,
            headers: headers.clone(),
        }
    }
}

/// Decoded path segments of `path`. `/` is the empty path.
///
/// Returns `None` when a segment is not valid UTF-8 once decoded.
pub fn split_path(path: &str) -> Option<Vec<String>> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    trimmed
        .split('/')
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned())
        })
        .collect()
}

/// Decoded query parameters. Repeated keys keep the last value.
pub fn parse_query(query: Option<&str>) -> Query {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Path segments and query of `uri`, or `None` if the path cannot be decoded.
pub fn split_uri(uri: &Uri) -> Option<(Vec<String>, Query)> {
    Some((split_path(uri.path())?, parse_query(uri.query())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/"), Some(vec![]));
        assert_eq!(split_path(""), Some(vec![]));
        assert_eq!(split_path("/has-param/42").unwrap(), vec!["has-param", "42"]);
        assert_eq!(split_path("/a/").unwrap(), vec!["a", ""]);
        assert_eq!(split_path("/files/a%20b%2Fc").unwrap(), vec!["files", "a b/c"]);
        assert_eq!(split_path("/files/%C3%A9").unwrap(), vec!["files", "\u{e9}"]);
    }

    #[test]
    fn test_split_path_rejects_invalid_utf8() {
        assert_eq!(split_path("/files/%FF"), None);
        assert_eq!(split_path("/%C3/ok"), None);
        assert!(split_uri(&"/files/%FF?q=1".parse().unwrap()).is_none());
    }

    #[test]
    fn test_parse_query() {
        let query = parse_query(Some("q=x+y&page=2&page=3"));
        assert_eq!(query.get("q").map(String::as_str), Some("x y"));
        assert_eq!(query.get("page").map(String::as_str), Some("3"));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_request_env() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, "abc".parse().unwrap());
        assert_eq!(RequestEnv::from_headers(&headers).request_id, "abc");
        assert_eq!(RequestEnv::from_headers(&HeaderMap::new()).request_id, "unknown");
    }
}

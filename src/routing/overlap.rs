//! Overlap analysis between patterns of one table.
//!
//! Two rows overlap when some path matches both structurally. Overlaps are
//! legal (declaration order decides) but usually unintended, so the table
//! builder reports them as warnings. The check is conservative: capture
//! types that could share a value are assumed to.

use crate::routing::param::ParamType;
use crate::routing::pattern::{RoutePattern, Segment};

/// A pair of overlapping rows, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub earlier: &'a str,
    pub later: &'a str,
}

/// Every overlapping pair among `rows`.
pub fn find_overlaps<'a, I>(rows: I) -> Vec<Overlap<'a>>
where
    I: IntoIterator<Item = (&'a str, &'a RoutePattern)>,
{
    let rows: Vec<_> = rows.into_iter().collect();
    let mut overlaps = Vec::new();
    for (i, &(earlier, a)) in rows.iter().enumerate() {
        for &(later, b) in &rows[i + 1..] {
            if patterns_overlap(a, b) {
                overlaps.push(Overlap { earlier, later });
            }
        }
    }
    overlaps
}

/// Whether some path can match both `a` and `b`.
pub fn patterns_overlap(a: &RoutePattern, b: &RoutePattern) -> bool {
    segments_overlap(a.segments(), b.segments())
}

fn segments_overlap(a: &[Segment], b: &[Segment]) -> bool {
    match (a.split_first(), b.split_first()) {
        (None, None) => true,
        (Some((Segment::Mount(_), _)), _) | (_, Some((Segment::Mount(_), _))) => true,
        (Some((Segment::Multi(t), _)), _) => absorbs(*t, b),
        (_, Some((Segment::Multi(t), _))) => absorbs(*t, a),
        (None, Some(_)) | (Some(_), None) => false,
        (Some((x, rest_a)), Some((y, rest_b))) => {
            single_overlap(x, y) && segments_overlap(rest_a, rest_b)
        }
    }
}

// Can a `*t` capture consume a path matched by `rest`?
fn absorbs(t: ParamType, rest: &[Segment]) -> bool {
    rest.iter().all(|segment| match segment {
        Segment::Literal(s) => t.parse(s).is_some(),
        Segment::Capture(u) | Segment::Multi(u) => types_intersect(t, *u),
        Segment::Mount(_) => true,
    })
}

fn single_overlap(x: &Segment, y: &Segment) -> bool {
    match (x, y) {
        (Segment::Literal(l), Segment::Literal(r)) => l == r,
        (Segment::Literal(l), Segment::Capture(t)) | (Segment::Capture(t), Segment::Literal(l)) => {
            t.parse(l).is_some()
        }
        (Segment::Capture(l), Segment::Capture(r)) => types_intersect(*l, *r),
        _ => true,
    }
}

fn types_intersect(a: ParamType, b: ParamType) -> bool {
    use ParamType::*;
    match (a, b) {
        _ if a == b => true,
        (Text, _) | (_, Text) => true,
        (Int, UInt) | (UInt, Int) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlap(a: &str, b: &str) -> bool {
        patterns_overlap(&a.parse().unwrap(), &b.parse().unwrap())
    }

    #[test]
    fn test_literals() {
        assert!(overlap("/a", "/a"));
        assert!(!overlap("/a", "/b"));
        assert!(!overlap("/a", "/a/b"));
        assert!(overlap("/", "/"));
    }

    #[test]
    fn test_captures() {
        assert!(overlap("/user/#Int", "/user/42"));
        assert!(!overlap("/user/#Int", "/user/me"));
        assert!(overlap("/user/#Text", "/user/me"));
        assert!(!overlap("/flag/#Bool", "/flag/#Int"));
        assert!(overlap("/n/#Int", "/n/#UInt"));
    }

    #[test]
    fn test_rest_consumers() {
        assert!(overlap("/static/@Static", "/static/css/app.css"));
        assert!(overlap("/static/@Static", "/static"));
        assert!(overlap("/sum/*Int", "/sum/1/2"));
        assert!(!overlap("/sum/*Int", "/sum/x"));
        assert!(!overlap("/other/@Static", "/static/x"));
    }

    #[test]
    fn test_find_overlaps_keeps_order() {
        let a: RoutePattern = "/thing".parse().unwrap();
        let b: RoutePattern = "/#Text".parse().unwrap();
        let c: RoutePattern = "/x/y".parse().unwrap();
        let found = find_overlaps([("A", &a), ("B", &b), ("C", &c)]);
        assert_eq!(found, vec![Overlap { earlier: "A", later: "B" }]);
    }
}

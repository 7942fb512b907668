//! Path strings and point access.
//!
//! Path construction is kept separate from the tree walkers so the join
//! policy stays independently testable. Paths join segments with `.` and
//! perform no escaping: a field name containing `.` produces an ambiguous
//! path string. That is a documented limitation the caller must avoid,
//! not something this module papers over.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Default segment name standing in for "any index" when enumerating list
/// element paths at the type level. Always overridable per call site; two
/// flattening conventions use different names for the same hole.
pub const DEFAULT_WILDCARD: &str = "n";

/// Join a path prefix and one segment with `.`. An empty prefix yields the
/// bare segment, so a root prefix of `""` produces clean top-level paths.
pub fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

// ------------------------------ Segments ---------------------------------- //

/// One primitive access step: a record field or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{name}"),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A sequence of segments addressing one location inside a value. The empty
/// path addresses the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValuePath(Vec<Segment>);

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Clone-and-extend; the walkers build child paths this way.
    pub fn child(&self, segment: Segment) -> Self {
        let mut out = self.clone();
        out.0.push(segment);
        out
    }

    /// Parse a dotted path string. All-digit segments become indices.
    /// Inverse of `Display` up to the unescaped-`.` ambiguity.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        let segments = s
            .split('.')
            .map(|seg| match seg.parse::<usize>() {
                Ok(i) => Segment::Index(i),
                Err(_) => Segment::Field(seg.to_string()),
            })
            .collect();
        Self(segments)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{seg}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<Segment> for ValuePath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ----------------------------- Point access ------------------------------- //

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot assign the root value through a path")]
    Root,
    #[error("`{path}`: index {index} out of bounds (len {len})")]
    IndexOutOfBounds { path: String, index: usize, len: usize },
    #[error("`{path}`: segment `{segment}` does not address into a {found}")]
    KindMismatch {
        path: String,
        segment: String,
        found: &'static str,
    },
}

pub(crate) fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the value at `path`, or `None` if any step is absent or addresses
/// into a non-container.
pub fn get_at<'a>(root: &'a Value, path: &ValuePath) -> Option<&'a Value> {
    let mut cur = root;
    for seg in path.segments() {
        cur = match (seg, cur) {
            (Segment::Field(name), Value::Object(map)) => map.get(name)?,
            (Segment::Index(i), Value::Array(xs)) => xs.get(*i)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Point mutation: assign `new` at `path` inside `root`. Assigning a record
/// key inserts or overwrites; assigning a list index splices that index and
/// must stay in bounds. The root itself cannot be assigned.
pub fn set_at(root: &mut Value, path: &ValuePath, new: Value) -> Result<(), PathError> {
    let (last, parents) = match path.segments().split_last() {
        Some(split) => split,
        None => return Err(PathError::Root),
    };

    let mut cur = root;
    let mut walked = ValuePath::root();
    for seg in parents {
        walked = walked.child(seg.clone());
        cur = match (seg, cur) {
            (Segment::Field(name), Value::Object(map)) => match map.get_mut(name) {
                Some(v) => v,
                None => {
                    return Err(PathError::KindMismatch {
                        path: walked.to_string(),
                        segment: seg.to_string(),
                        found: "missing field",
                    });
                }
            },
            (Segment::Index(i), Value::Array(xs)) => {
                let len = xs.len();
                match xs.get_mut(*i) {
                    Some(v) => v,
                    None => {
                        return Err(PathError::IndexOutOfBounds {
                            path: walked.to_string(),
                            index: *i,
                            len,
                        });
                    }
                }
            }
            (seg, other) => {
                return Err(PathError::KindMismatch {
                    path: walked.to_string(),
                    segment: seg.to_string(),
                    found: value_kind(other),
                });
            }
        };
    }

    match (last, cur) {
        (Segment::Field(name), Value::Object(map)) => {
            map.insert(name.clone(), new);
            Ok(())
        }
        (Segment::Index(i), Value::Array(xs)) => {
            let len = xs.len();
            match xs.get_mut(*i) {
                Some(slot) => {
                    *slot = new;
                    Ok(())
                }
                None => Err(PathError::IndexOutOfBounds {
                    path: path.to_string(),
                    index: *i,
                    len,
                }),
            }
        }
        (seg, other) => Err(PathError::KindMismatch {
            path: path.to_string(),
            segment: seg.to_string(),
            found: value_kind(other),
        }),
    }
}

// ------------------------------- Tests ------------------------------------ //

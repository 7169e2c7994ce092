//! Route matching logic.
//!
//! # Responsibilities
//! - Split the request path into segments
//! - Compare against patterns with the same segment count
//! - Bind parameter segments to their names
//! - Distinguish "no such path" from "path exists, method not allowed"
//!
//! # Design Decisions
//! - Literal segments are case-sensitive and compared verbatim
//! - Parameter values are captured raw (no percent-decoding)
//! - The first pattern in precedence order that fits the path wins; its
//!   method set alone decides between Found and MethodNotAllowed
//! - No regex to guarantee O(n) matching

use axum::http::Method;

use crate::routing::pattern::{split_path, RoutePattern};
use crate::routing::router::RouteTable;

/// Parameter values bound by a matched pattern, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    pairs: Vec<(String, String)>,
}

impl Bindings {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// First value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl IntoIterator for Bindings {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Outcome of resolving a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch<'t> {
    /// A pattern matched the path and allows the method.
    Found {
        pattern: &'t RoutePattern,
        bindings: Bindings,
    },
    /// No pattern matches the path.
    NotFound,
    /// The winning pattern does not allow the method.
    MethodNotAllowed { allowed: Vec<Method> },
}

impl RouteTable {
    /// Resolve a method and path to a pattern and its bindings.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let segments: Vec<&str> = split_path(path).collect();

        let winner = self
            .iter()
            .find_map(|pattern| pattern.bind(&segments).map(|bindings| (pattern, bindings)));

        match winner {
            Some((pattern, bindings)) if pattern.allows(method) => {
                RouteMatch::Found { pattern, bindings }
            }
            Some((pattern, _)) => RouteMatch::MethodNotAllowed {
                allowed: pattern.methods().to_vec(),
            },
            None => RouteMatch::NotFound,
        }
    }
}

//! Path templates.
//!
//! # Syntax
//! - Templates are `/` separated, absolute paths
//! - `:name` matches exactly one path segment and binds it to `name`
//! - Any other segment is a literal, compared verbatim
//! - `*` segments are rejected (no catch-all support)
//!
//! # Design Decisions
//! - Empty segments are ignored, so `/` has zero segments and `/ping/` equals `/ping`
//! - Method names are normalized to upper case at registration
//! - Two templates conflict when their shapes are equal; parameter names
//!   do not contribute to the shape

use std::fmt;

use axum::http::Method;

use crate::routing::error::RegistrationError;
use crate::routing::matcher::Bindings;

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches the identical path segment.
    Literal(String),
    /// Matches any single path segment, binding it under this name.
    Param(String),
}

impl Segment {
    fn shape(&self) -> Option<&str> {
        match self {
            Segment::Literal(text) => Some(text),
            Segment::Param(_) => None,
        }
    }
}

/// A registered path template together with its allowed methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    template: String,
    segments: Vec<Segment>,
    methods: Vec<Method>,
}

impl RoutePattern {
    /// Parse a template and its declared methods.
    pub fn parse<S: AsRef<str>>(template: &str, methods: &[S]) -> Result<Self, RegistrationError> {
        if !template.starts_with('/') {
            return Err(RegistrationError::MissingLeadingSlash {
                template: template.to_string(),
            });
        }

        let mut segments = Vec::new();
        for raw in split_path(template) {
            if let Some(name) = raw.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RegistrationError::EmptyParameterName {
                        template: template.to_string(),
                    });
                }
                segments.push(Segment::Param(name.to_string()));
            } else if raw.starts_with('*') {
                return Err(RegistrationError::WildcardSegment {
                    template: template.to_string(),
                });
            } else {
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        if methods.is_empty() {
            return Err(RegistrationError::EmptyMethods {
                template: template.to_string(),
            });
        }

        let mut allowed: Vec<Method> = Vec::with_capacity(methods.len());
        for name in methods {
            let name = name.as_ref();
            let normalized = name.trim().to_ascii_uppercase();
            let method = Method::from_bytes(normalized.as_bytes()).map_err(|_| {
                RegistrationError::InvalidMethod {
                    template: template.to_string(),
                    method: name.to_string(),
                }
            })?;
            if !allowed.contains(&method) {
                allowed.push(method);
            }
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            methods: allowed,
        })
    }

    /// The template as declared by the worker.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Allowed methods, in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Number of parameter segments. Lower means more literal.
    pub fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    /// True if both templates match exactly the same set of paths.
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.shape() == b.shape())
    }

    /// Match already-split path segments, returning the parameter bindings.
    pub fn bind(&self, path: &[&str]) -> Option<Bindings> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut bindings = Bindings::default();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(text) if text == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => bindings.push(name, *value),
            }
        }
        Some(bindings)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Split a path into its non-empty segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

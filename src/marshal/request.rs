//! Request direction: wire data to worker call arguments.

use std::borrow::Cow;

use axum::http::{request, HeaderMap, HeaderName, HeaderValue, Method};
use bytes::Bytes;

use crate::marshal::params::{Headers, Params};
use crate::routing::{Bindings, RoutePattern};

/// A request as handed over by the host's HTTP layer.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WireRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build from a target such as `/hello/world?a=1`.
    pub fn from_target(method: Method, target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(method, path).with_query(query),
            None => Self::new(method, target),
        }
    }

    pub fn from_parts(parts: request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Call arguments for a worker's per-request entry point.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// The request path as received.
    pub path: String,
    /// Template of the pattern that resolved this request.
    pub route: String,
    /// One value per parameter segment; repeated names accumulate.
    pub path_params: Params,
    pub query: Params,
    pub headers: Headers,
    /// Passed through uninterpreted.
    pub body: Bytes,
}

impl InboundRequest {
    /// Marshal a resolved wire request.
    pub fn build(pattern: &RoutePattern, bindings: Bindings, wire: WireRequest) -> Self {
        Self {
            path_params: bindings.into_iter().collect(),
            query: wire.query.as_deref().map(Params::from_query).unwrap_or_default(),
            headers: Headers::from_header_map(&wire.headers),
            route: pattern.template().to_string(),
            method: wire.method,
            path: wire.path,
            body: wire.body,
        }
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteDeclarations, RouteMatch, RouteTable};

    fn resolve(table: &RouteTable, wire: WireRequest) -> InboundRequest {
        match table.match_route(&wire.method, &wire.path) {
            RouteMatch::Found { pattern, bindings } => {
                InboundRequest::build(pattern, bindings, wire)
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_build_call_arguments() {
        let declarations = RouteDeclarations::new().route("/hello/:target", ["GET"]);
        let table = RouteTable::register(&declarations).unwrap();
        let wire = WireRequest::from_target(Method::GET, "/hello/world?a=1&a=2")
            .with_header(HeaderName::from_static("x-sleep"), HeaderValue::from_static("0"))
            .with_body("payload");

        let call = resolve(&table, wire);
        assert_eq!(call.method, Method::GET);
        assert_eq!(call.path, "/hello/world");
        assert_eq!(call.route, "/hello/:target");
        assert_eq!(call.path_params.get("target"), Some(&["world".to_string()][..]));
        assert_eq!(call.query.get("a"), Some(&["1".to_string(), "2".into()][..]));
        assert_eq!(call.headers.first("X-Sleep"), Some("0"));
        assert_eq!(call.body_text(), "payload");
    }

    #[test]
    fn test_missing_query_and_body() {
        let table = RouteTable::register(&RouteDeclarations::new().route("/", ["GET"])).unwrap();
        let call = resolve(&table, WireRequest::new(Method::GET, "/"));
        assert!(call.query.is_empty());
        assert!(call.path_params.is_empty());
        assert!(call.body.is_empty());
    }

    #[test]
    fn test_body_passed_through_uninterpreted() {
        let declarations = RouteDeclarations::new().route("/raw", ["POST"]);
        let table = RouteTable::register(&declarations).unwrap();
        let wire = WireRequest::new(Method::POST, "/raw")
            .with_header(
                HeaderName::from_static("content-type"),
                HeaderValue::from_static("application/json"),
            )
            .with_body(vec![0u8, 159, 146, 150]);

        let call = resolve(&table, wire);
        assert_eq!(&call.body[..], &[0u8, 159, 146, 150]);
    }
}

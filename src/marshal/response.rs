//! Response direction: worker return values to wire responses.
//!
//! # Design Decisions
//! - Status codes outside `100..=599` are contract violations
//! - Header names and values must be valid HTTP; nothing is escaped or dropped
//! - Responses synthesized by the host (404, 405, 5xx) are plain text

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use thiserror::Error;

use crate::marshal::params::Headers;

/// Raw return value of a worker's per-request entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReply {
    pub status: u16,
    pub body: Bytes,
    pub headers: Headers,
}

impl WorkerReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Headers::new(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// The worker's return value violates the calling contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("worker returned invalid status code {0}")]
    InvalidStatus(u16),

    #[error("worker returned invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("worker returned a value for header {name:?} that is not a valid header string")]
    InvalidHeaderValue { name: String },
}

/// A validated response, ready for the HTTP layer.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub headers: HeaderMap,
}

impl OutboundResponse {
    /// Validate a worker reply.
    pub fn unmarshal(reply: WorkerReply) -> Result<Self, ProtocolError> {
        if !(100..=599).contains(&reply.status) {
            return Err(ProtocolError::InvalidStatus(reply.status));
        }
        let status = StatusCode::from_u16(reply.status)
            .map_err(|_| ProtocolError::InvalidStatus(reply.status))?;

        let mut headers = HeaderMap::with_capacity(reply.headers.len());
        for (name, values) in reply.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ProtocolError::InvalidHeaderName(name.to_string()))?;
            for value in values {
                let header_value =
                    HeaderValue::from_str(value).map_err(|_| ProtocolError::InvalidHeaderValue {
                        name: name.to_string(),
                    })?;
                headers.append(header_name.clone(), header_value);
            }
        }

        Ok(Self {
            status,
            body: reply.body,
            headers,
        })
    }

    /// A plain-text response produced by the host itself.
    pub fn synthesized(status: StatusCode, message: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            body: Bytes::from_static(message.as_bytes()),
            headers,
        }
    }

    pub fn not_found() -> Self {
        Self::synthesized(StatusCode::NOT_FOUND, "No matching route found")
    }

    /// 405 with an `Allow` header listing the acceptable methods.
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let mut response = Self::synthesized(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers.insert(header::ALLOW, value);
        }
        response
    }

    pub fn worker_failed() -> Self {
        Self::synthesized(StatusCode::INTERNAL_SERVER_ERROR, "Worker failed to handle request")
    }

    pub fn gateway_timeout() -> Self {
        Self::synthesized(StatusCode::GATEWAY_TIMEOUT, "Worker did not respond in time")
    }

    pub fn unavailable(message: &'static str) -> Self {
        Self::synthesized(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

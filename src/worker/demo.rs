//! Demonstration worker.
//!
//! Declares `/`, `/ping` and `/hello/:target`, counts the requests it has
//! served, and honours an `X-Sleep: <seconds>` request header by blocking
//! before it replies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::marshal::{Headers, InboundRequest, WorkerReply};
use crate::routing::RouteDeclarations;
use crate::worker::{Worker, WorkerError};

const SLEEP_HEADER: &str = "X-Sleep";
/// Longest delay `X-Sleep` can ask for.
const MAX_SLEEP: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
pub struct DemoWorker {
    requests: AtomicU64,
}

impl DemoWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests handled so far.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Worker for DemoWorker {
    fn init(&self) -> Result<RouteDeclarations, WorkerError> {
        self.requests.store(0, Ordering::SeqCst);
        tracing::info!(count = 0, "Demo worker initialized");

        Ok(RouteDeclarations::new()
            .route("/", ["GET"])
            .route("/ping", ["GET"])
            .route("/hello/:target", ["GET"]))
    }

    fn handle(&self, request: &InboundRequest) -> Result<WorkerReply, WorkerError> {
        let count = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            count,
            method = %request.method,
            path = %request.path,
            params = ?request.path_params,
            query = ?request.query,
            headers = ?request.headers,
            body = %request.body_text(),
            "Demo request received"
        );

        if let Some(delay) = sleep_hint(&request.headers)? {
            std::thread::sleep(delay);
        }

        let body = format!("request #{}", group_thousands(count));
        Ok(WorkerReply::ok(body).with_header("X-Test", "1"))
    }
}

fn sleep_hint(headers: &Headers) -> Result<Option<Duration>, WorkerError> {
    let Some(raw) = headers.first(SLEEP_HEADER) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map(|delay| Some(delay.min(MAX_SLEEP)))
        .ok_or_else(|| WorkerError::msg(format!("invalid {} value {:?}", SLEEP_HEADER, raw)))
}

/// `1234567` → `"1,234,567"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::WireRequest;
    use crate::routing::{RouteMatch, RouteTable};
    use axum::http::{HeaderName, HeaderValue, Method};

    fn call(table: &RouteTable, wire: WireRequest) -> InboundRequest {
        match table.match_route(&wire.method, &wire.path) {
            RouteMatch::Found { pattern, bindings } => {
                InboundRequest::build(pattern, bindings, wire)
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_counts_requests() {
        let worker = DemoWorker::new();
        let table = RouteTable::register(&worker.init().unwrap()).unwrap();

        for expected in 1..=3 {
            let reply = worker
                .handle(&call(&table, WireRequest::new(Method::GET, "/ping")))
                .unwrap();
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, format!("request #{}", expected));
            assert_eq!(reply.headers.first("x-test"), Some("1"));
        }
        assert_eq!(worker.requests(), 3);
    }

    #[test]
    fn test_sleep_hint_is_capped() {
        let hint = |value: &str| {
            let headers: Headers = [("X-Sleep", value)].into_iter().collect();
            sleep_hint(&headers).unwrap()
        };
        assert_eq!(hint("1e9"), Some(MAX_SLEEP));
        assert_eq!(hint("61"), Some(MAX_SLEEP));
        assert_eq!(hint("0.5"), Some(Duration::from_millis(500)));
        assert!(sleep_hint(&Headers::new()).unwrap().is_none());
    }

    #[test]
    fn test_sleep_header() {
        let worker = DemoWorker::new();
        let table = RouteTable::register(&worker.init().unwrap()).unwrap();

        let wire = WireRequest::new(Method::GET, "/hello/world").with_header(
            HeaderName::from_static("x-sleep"),
            HeaderValue::from_static("0.01"),
        );
        assert!(worker.handle(&call(&table, wire)).is_ok());

        let wire = WireRequest::new(Method::GET, "/hello/world").with_header(
            HeaderName::from_static("x-sleep"),
            HeaderValue::from_static("soon"),
        );
        assert!(worker.handle(&call(&table, wire)).is_err());

        let wire = WireRequest::new(Method::GET, "/hello/world").with_header(
            HeaderName::from_static("x-sleep"),
            HeaderValue::from_static("-1"),
        );
        assert!(worker.handle(&call(&table, wire)).is_err());
    }
}

//! Response conversion for the HTTP layer.
//!
//! # Design Decisions
//! - Status, headers and body are written exactly as validated by the marshaler
//! - Worker timeouts surface as 504 Gateway Timeout, failures as 500

use axum::body::Body;
use axum::response::{IntoResponse, Response};

use crate::marshal::OutboundResponse;

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::WorkerReply;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_into_response() {
        let outbound =
            OutboundResponse::unmarshal(WorkerReply::new(201, "created").with_header("X-Test", "1"))
                .unwrap();
        let response = outbound.into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-test").unwrap(), "1");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"created");
    }
}

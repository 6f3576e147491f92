//! Per-request metrics middleware

use axum::{extract::Request, middleware::Next, response::Response};
use scholarflow_common::metrics::RequestMetrics;

/// Record request count and latency for every request
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();
    let tracker = RequestMetrics::start(&method, &endpoint);

    let response = next.run(request).await;

    tracker.finish(response.status().as_u16());
    response
}

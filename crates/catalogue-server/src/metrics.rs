//! Request counters
//!
//! Every request passing through [`track_requests`] is counted on the way in
//! and again, with its status and processing time, on the way out. The
//! totals are served at `/debug/vars`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use serde_json::{json, Value};

use crate::AppState;

/// Running totals since the server started.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests_received: AtomicU64,
    responses_sent: AtomicU64,
    processing_time_us: AtomicU64,
    responses_by_status: Mutex<BTreeMap<u16, u64>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    fn response_sent(&self, status: u16, started: Instant) {
        let elapsed = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.responses_sent.fetch_add(1, Ordering::Relaxed);
        self.processing_time_us.fetch_add(elapsed, Ordering::Relaxed);
        *self
            .responses_by_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(status)
            .or_insert(0) += 1;
    }

    pub fn requests_received(&self) -> u64 {
        self.requests_received.load(Ordering::Relaxed)
    }

    pub fn responses_sent(&self) -> u64 {
        self.responses_sent.load(Ordering::Relaxed)
    }

    /// Counters as served at `/debug/vars`. Status codes are object keys.
    pub fn snapshot(&self) -> Value {
        let by_status: BTreeMap<String, u64> = self
            .responses_by_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(status, count)| (status.to_string(), *count))
            .collect();

        json!({
            "total_requests_received": self.requests_received(),
            "total_responses_sent": self.responses_sent(),
            "total_processing_time_μs": self.processing_time_us.load(Ordering::Relaxed),
            "total_responses_sent_by_status": by_status,
        })
    }
}

/// Count the request, run the rest of the stack, count the response.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    state.metrics.request_received();

    let response = next.run(request).await;

    state
        .metrics
        .response_sent(response.status().as_u16(), started);
    response
}

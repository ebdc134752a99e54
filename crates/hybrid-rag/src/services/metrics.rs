use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::data::Route;

/// Per-request measurements reported after an answer is produced.
///
/// Emitted as a structured event on the `hybrid_rag::metrics` target so a
/// subscriber can route them to a separate sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetrics {
    pub timestamp: DateTime<Utc>,
    pub trace_id: String,
    pub route: Route,
    pub latency_ms: f64,
    pub query_length: usize,
    pub response_length: usize,
    pub vector_store_latency_ms: Option<f64>,
    pub graph_store_latency_ms: Option<f64>,
}

pub(crate) fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl QueryMetrics {
    pub fn record(&self) {
        info!(
            target: "hybrid_rag::metrics",
            trace_id = %self.trace_id,
            route = %self.route,
            latency_ms = self.latency_ms,
            query_length = self.query_length,
            response_length = self.response_length,
            vector_store_latency_ms = ?self.vector_store_latency_ms,
            graph_store_latency_ms = ?self.graph_store_latency_ms,
            "query completed"
        );
    }
}

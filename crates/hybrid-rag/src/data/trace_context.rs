//! Request identifiers shared by spans and metrics

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one query or ingestion request.
///
/// The id is recorded on the request span and copied into the request's
/// metrics, so log lines and metric events can be joined on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceContext {
    pub trace_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Fills the `trace_id` field of the current span, when it declares one.
    pub fn record_on_current_span(&self) {
        tracing::Span::current().record("trace_id", self.trace_id.as_str());
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_uuids() {
        let first = TraceContext::new();
        let second = TraceContext::new();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first.trace_id).is_ok());
    }

    #[test]
    fn test_serializes_as_bare_id() {
        let trace = TraceContext {
            trace_id: "t-1".to_string(),
        };
        assert_eq!(serde_json::to_string(&trace).unwrap(), "\"t-1\"");
    }
}

//! Query orchestration and per-request metrics

pub mod metrics;
pub mod retriever;

pub use metrics::QueryMetrics;
pub use retriever::{
    Answer, HybridRetriever, IngestSummary, Retrieval, RetrieverOptions, StoreTimings,
};

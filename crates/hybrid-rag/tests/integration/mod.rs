//! End-to-end scenarios run against in-process stores and mocked endpoints.

// Shared fixtures
pub mod test_utils;

pub mod graph_build_test;
pub mod graph_fallback_test;
pub mod retrieval_flow_test;
pub mod routing_test;

use async_trait::async_trait;

use crate::data::{GraphStoreError, Record};

/// One way of reaching the graph store.
///
/// Implementations report failures as errors; the connector decides how
/// they surface to callers.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Runs a parameterized statement and returns its rows as records.
    async fn run(&self, statement: &str, parameters: &Record) -> Result<Vec<Record>, GraphStoreError>;

    /// Address the transport talks to, for logs and connection state.
    fn endpoint(&self) -> &str;
}

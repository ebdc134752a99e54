use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GraphStoreConfig;
use crate::data::{ConnectionState, GraphStoreError, Metadata, NodeId, Record, Transport};
use crate::graph::cypher;
use crate::graph::http::{http_base_url, HttpTransport};
use crate::graph::transport::GraphTransport;
use crate::traits::{GraphStore, NodeHit, PathRow};

/// Graph store access with transport fallback.
///
/// `connect` tries the primary protocol, then the HTTP query API, and
/// settles on `Unavailable` if both fail. Once settled, the transport is
/// never changed implicitly; only `reconnect` repeats the sequence.
pub struct GraphStoreConnector {
    config: GraphStoreConfig,
    state: ConnectionState,
    transport: Option<Arc<dyn GraphTransport>>,
}

impl GraphStoreConnector {
    /// Runs the connection sequence. Never fails: an unreachable store yields
    /// a connector in the `Unavailable` state.
    pub async fn connect(config: GraphStoreConfig) -> Self {
        let (state, transport) = Self::establish(&config).await;
        Self {
            config,
            state,
            transport,
        }
    }

    /// A connector that never attempts a connection, for disabled graph support.
    pub fn disabled(config: GraphStoreConfig) -> Self {
        Self {
            state: ConnectionState::unavailable(config.uri.clone()),
            config,
            transport: None,
        }
    }

    /// Wraps an already established transport.
    pub fn with_transport(
        config: GraphStoreConfig,
        kind: Transport,
        transport: Arc<dyn GraphTransport>,
    ) -> Self {
        Self {
            state: ConnectionState {
                transport: kind,
                endpoint: transport.endpoint().to_string(),
            },
            config,
            transport: Some(transport),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Repeats the full connection sequence, replacing the current transport.
    ///
    /// Needs exclusive access, so it only applies to a connector that has not
    /// yet been shared as an `Arc<dyn GraphStore>`; a shared connector keeps
    /// the state it was wired with.
    pub async fn reconnect(&mut self) -> &ConnectionState {
        let (state, transport) = Self::establish(&self.config).await;
        self.state = state;
        self.transport = transport;
        &self.state
    }

    async fn establish(config: &GraphStoreConfig) -> (ConnectionState, Option<Arc<dyn GraphTransport>>) {
        match Self::connect_primary(config).await {
            Ok(transport) => {
                info!("Graph store connected over primary transport at {}", transport.endpoint());
                return (
                    ConnectionState {
                        transport: Transport::Primary,
                        endpoint: transport.endpoint().to_string(),
                    },
                    Some(transport),
                );
            }
            Err(e) => warn!("Primary graph transport failed: {}; trying HTTP fallback", e),
        }

        let base_url = config
            .http_uri
            .clone()
            .unwrap_or_else(|| http_base_url(&config.uri));

        let fallback = match HttpTransport::new(base_url.clone(), config) {
            Ok(transport) => transport.check_connectivity().await.map(|_| transport),
            Err(e) => Err(e),
        };

        match fallback {
            Ok(transport) => {
                info!("Graph store connected over HTTP fallback at {}", base_url);
                let transport: Arc<dyn GraphTransport> = Arc::new(transport);
                (
                    ConnectionState {
                        transport: Transport::HttpFallback,
                        endpoint: transport.endpoint().to_string(),
                    },
                    Some(transport),
                )
            }
            Err(e) => {
                error!("HTTP fallback to {} failed: {}; graph store unavailable", base_url, e);
                (ConnectionState::unavailable(config.uri.clone()), None)
            }
        }
    }

    #[cfg(feature = "bolt")]
    async fn connect_primary(config: &GraphStoreConfig) -> Result<Arc<dyn GraphTransport>, GraphStoreError> {
        use crate::graph::bolt::BoltTransport;

        match tokio::time::timeout(config.timeout, BoltTransport::connect(config)).await {
            Ok(Ok(transport)) => Ok(Arc::new(transport)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(GraphStoreError::Connection(format!(
                "No response from {} within {:?}",
                config.uri, config.timeout
            ))),
        }
    }

    #[cfg(not(feature = "bolt"))]
    async fn connect_primary(_config: &GraphStoreConfig) -> Result<Arc<dyn GraphTransport>, GraphStoreError> {
        Err(GraphStoreError::Connection(
            "Bolt transport not compiled in (enable the 'bolt' feature)".to_string(),
        ))
    }

    async fn run(&self, statement: &str, parameters: &Record) -> Result<Vec<Record>, GraphStoreError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| GraphStoreError::Connection("graph store unavailable".to_string()))?;

        match tokio::time::timeout(self.config.timeout, transport.run(statement, parameters)).await {
            Ok(result) => result,
            Err(_) => Err(GraphStoreError::Connection(format!(
                "Query timed out after {:?}",
                self.config.timeout
            ))),
        }
    }

    /// Runs a statement and decodes each row, skipping rows that do not fit `T`.
    async fn query_as<T: DeserializeOwned>(&self, statement: &str, parameters: Record) -> Vec<T> {
        self.execute(statement, parameters)
            .await
            .into_iter()
            .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping malformed graph row: {}", e);
                    None
                }
            })
            .collect()
    }
}

fn properties_record(properties: Metadata) -> Value {
    Value::Object(
        properties
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    )
}

#[async_trait]
impl GraphStore for GraphStoreConnector {
    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    #[instrument(skip(self, statement, parameters), fields(transport = %self.state.transport))]
    async fn execute(&self, statement: &str, parameters: Record) -> Vec<Record> {
        if self.transport.is_none() {
            debug!("Graph store unavailable, skipping query");
            return Vec::new();
        }

        match self.run(statement, &parameters).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Graph query failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn create_node(&self, label: &str, properties: Metadata) -> Option<NodeId> {
        let mut parameters = Record::new();
        parameters.insert("props".to_string(), properties_record(properties));

        let rows = self.execute(&cypher::create_node(label), parameters).await;
        rows.first()
            .and_then(|row| row.get("node_id"))
            .and_then(Value::as_i64)
            .map(NodeId)
    }

    async fn create_relationship(
        &self,
        from: NodeId,
        to: NodeId,
        rel_type: &str,
        properties: Metadata,
    ) -> Vec<Record> {
        let mut parameters = Record::new();
        parameters.insert("from_id".to_string(), json!(from.0));
        parameters.insert("to_id".to_string(), json!(to.0));
        parameters.insert("props".to_string(), properties_record(properties));

        self.execute(&cypher::create_relationship(rel_type), parameters).await
    }

    async fn search_nodes(&self, keyword: &str, limit: usize) -> Vec<NodeHit> {
        let mut parameters = Record::new();
        parameters.insert("keyword".to_string(), json!(keyword));
        parameters.insert("limit".to_string(), json!(limit));

        self.query_as(cypher::SEARCH_NODES, parameters).await
    }

    async fn get_neighborhood(&self, node_id: NodeId, depth: usize, limit: usize) -> Vec<PathRow> {
        let mut parameters = Record::new();
        parameters.insert("node_id".to_string(), json!(node_id.0));
        parameters.insert("limit".to_string(), json!(limit));

        self.query_as(&cypher::neighborhood(depth), parameters).await
    }
}

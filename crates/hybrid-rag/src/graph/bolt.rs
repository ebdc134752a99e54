use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph, Query,
};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::GraphStoreConfig;
use crate::data::{GraphStoreError, Record};
use crate::graph::cypher;
use crate::graph::transport::GraphTransport;

const MAX_CONNECTIONS: usize = 10;

/// Graph transport over the native Bolt protocol.
pub struct BoltTransport {
    graph: Graph,
    endpoint: String,
}

impl BoltTransport {
    /// Opens a connection pool and runs the connectivity check through it.
    ///
    /// The pool connects lazily, so a successful check is the only proof
    /// that the store is reachable.
    pub async fn connect(config: &GraphStoreConfig) -> Result<Self, GraphStoreError> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(MAX_CONNECTIONS)
            .build()
            .map_err(|e| GraphStoreError::Connection(format!("Failed to build Neo4j config: {}", e)))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| GraphStoreError::Connection(e.to_string()))?;

        let transport = Self {
            graph,
            endpoint: config.uri.clone(),
        };
        transport
            .run(cypher::CONNECTIVITY_CHECK, &Record::new())
            .await
            .map_err(|e| GraphStoreError::Connection(format!("Connection test failed: {}", e)))?;

        info!("Connected to Neo4j at {}", config.uri);
        Ok(transport)
    }
}

#[async_trait]
impl GraphTransport for BoltTransport {
    #[instrument(skip(self, parameters), fields(endpoint = %self.endpoint))]
    async fn run(&self, statement: &str, parameters: &Record) -> Result<Vec<Record>, GraphStoreError> {
        let mut query = Query::new(statement.to_string());
        for (key, value) in parameters {
            query = query.param(key, json_to_bolt(value));
        }

        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            let record: Record = row
                .to()
                .map_err(|e| GraphStoreError::Mapping(e.to_string()))?;
            rows.push(record);
        }

        debug!("Bolt query returned {} rows", rows.len());
        Ok(rows)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Converts a JSON parameter into its Bolt representation.
///
/// Integral numbers stay integers so that `LIMIT` and `id()` comparisons
/// receive the type the server expects.
pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or_default())),
        },
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt_map = BoltMap::new();
            for (key, item) in map {
                bolt_map.put(BoltString::new(key), json_to_bolt(item));
            }
            BoltType::Map(bolt_map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_bolt_scalars() {
        assert!(matches!(json_to_bolt(&json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(&json!(true)), BoltType::Boolean(_)));
        assert!(matches!(json_to_bolt(&json!(42)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(&json!(0.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(&json!("panel")), BoltType::String(_)));
    }

    #[test]
    fn test_json_to_bolt_nested() {
        let value = json!({"name": "Solar Panel X", "tags": ["solar", "panel"]});
        match json_to_bolt(&value) {
            BoltType::Map(map) => {
                assert_eq!(map.value.len(), 2);
                assert!(matches!(
                    map.value.get(&BoltString::new("tags")),
                    Some(BoltType::List(_))
                ));
            }
            other => panic!("Expected map, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        let config = GraphStoreConfig {
            enabled: true,
            uri: "neo4j://127.0.0.1:9".to_string(),
            password: "secret".to_string(),
            ..GraphStoreConfig::default()
        };

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            BoltTransport::connect(&config),
        )
        .await;

        // Either the attempt errors or it is still hanging; it never succeeds.
        if let Ok(outcome) = result {
            assert!(matches!(outcome, Err(GraphStoreError::Connection(_))));
        }
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::GraphStoreConfig;
use crate::data::{GraphStoreError, Record};
use crate::graph::cypher;
use crate::graph::transport::GraphTransport;

/// Request payload for the HTTP query endpoint
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    statement: &'a str,
    parameters: &'a Record,
}

/// Columnar result: one field list, one value list per row
#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<QueryData>,
}

/// Graph transport over the store's HTTP query API (`/db/<db>/query/v2`).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    query_url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    /// Builds a transport against `base_url`; no request is sent.
    pub fn new(base_url: impl Into<String>, config: &GraphStoreConfig) -> Result<Self, GraphStoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphStoreError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            query_url: format!("{}/db/{}/query/v2", base_url, config.database),
            base_url,
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Sends the connectivity check; only 200 and 202 count as reachable.
    pub async fn check_connectivity(&self) -> Result<(), GraphStoreError> {
        self.run(cypher::CONNECTIVITY_CHECK, &Record::new()).await.map(|_| ())
    }

    fn zip_rows(data: QueryData) -> Vec<Record> {
        data.values
            .into_iter()
            .map(|row| data.fields.iter().cloned().zip(row).collect::<Record>())
            .collect()
    }
}

#[async_trait]
impl GraphTransport for HttpTransport {
    #[instrument(skip(self, parameters), fields(url = %self.query_url))]
    async fn run(&self, statement: &str, parameters: &Record) -> Result<Vec<Record>, GraphStoreError> {
        let request = QueryRequest { statement, parameters };

        let response = self
            .client
            .post(&self.query_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED => {
                let body: QueryResponse = response.json().await?;
                let rows = Self::zip_rows(body.data.unwrap_or_default());
                debug!("HTTP query returned {} rows", rows.len());
                Ok(rows)
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_default();
                let snippet: String = body.chars().take(200).collect();
                Err(GraphStoreError::QueryExecution(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    snippet
                )))
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

/// Derives the HTTP base URL from a Bolt-style connection URI.
///
/// Secure schemes map to `https`, plain ones to `http`; the port is kept.
pub fn http_base_url(uri: &str) -> String {
    const SCHEMES: [(&str, &str); 6] = [
        ("neo4j+ssc://", "https://"),
        ("neo4j+s://", "https://"),
        ("bolt+ssc://", "https://"),
        ("bolt+s://", "https://"),
        ("neo4j://", "http://"),
        ("bolt://", "http://"),
    ];

    let uri = uri.trim().trim_end_matches('/');
    for (from, to) in SCHEMES {
        if let Some(rest) = uri.strip_prefix(from) {
            return format!("{}{}", to, rest);
        }
    }

    if uri.contains("://") {
        uri.to_string()
    } else {
        format!("http://{}", uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> GraphStoreConfig {
        GraphStoreConfig {
            enabled: true,
            username: "neo4j".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(5),
            ..GraphStoreConfig::default()
        }
    }

    #[test]
    fn test_http_base_url_rewrites_schemes() {
        assert_eq!(http_base_url("neo4j+s://abc.databases.neo4j.io"), "https://abc.databases.neo4j.io");
        assert_eq!(http_base_url("neo4j+ssc://host:7687/"), "https://host:7687");
        assert_eq!(http_base_url("bolt+s://host"), "https://host");
        assert_eq!(http_base_url("neo4j://localhost:7687"), "http://localhost:7687");
        assert_eq!(http_base_url("bolt://localhost"), "http://localhost");
        assert_eq!(http_base_url("https://already.http/"), "https://already.http");
        assert_eq!(http_base_url("localhost:7474"), "http://localhost:7474");
    }

    #[tokio::test]
    async fn test_run_zips_fields_and_values() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/db/neo4j/query/v2"))
            .and(header("authorization", "Basic bmVvNGo6c2VjcmV0"))
            .and(body_partial_json(json!({
                "statement": "MATCH (n) RETURN n.name AS name, id(n) AS id",
                "parameters": {"limit": 2}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "fields": ["name", "id"],
                    "values": [["Solar Panel X", 1], ["Inverter Z", 2]]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(mock_server.uri(), &test_config()).unwrap();
        let mut parameters = Record::new();
        parameters.insert("limit".to_string(), json!(2));

        let rows = transport
            .run("MATCH (n) RETURN n.name AS name, id(n) AS id", &parameters)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("Solar Panel X"));
        assert_eq!(rows[1]["id"], json!(2));
    }

    #[tokio::test]
    async fn test_connectivity_check_accepts_202() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/db/neo4j/query/v2"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "data": {"fields": ["test"], "values": [[1]]}
            })))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(mock_server.uri(), &test_config()).unwrap();
        assert!(transport.check_connectivity().await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_is_query_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/db/neo4j/query/v2"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(mock_server.uri(), &test_config()).unwrap();
        match transport.check_connectivity().await {
            Err(GraphStoreError::QueryExecution(msg)) => assert!(msg.contains("401")),
            other => panic!("Expected query execution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_data_yields_no_rows() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/db/neo4j/query/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bookmarks": []})))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(mock_server.uri(), &test_config()).unwrap();
        let rows = transport.run("RETURN 1", &Record::new()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let transport = HttpTransport::new("http://127.0.0.1:9", &test_config()).unwrap();
        assert!(matches!(
            transport.check_connectivity().await,
            Err(GraphStoreError::Connection(_))
        ));
    }
}

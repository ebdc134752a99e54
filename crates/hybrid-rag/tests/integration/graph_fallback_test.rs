use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hybrid_rag::graph::cypher;
use hybrid_rag::test_utils::{CannedCompletion, StaticVectorStore};
use hybrid_rag::{
    GraphStore, GraphStoreConnector, HybridRetriever, Origin, Route, TextFileLoader, Transport,
};

use super::test_utils::unreachable_graph_config;

const QUERY_PATH: &str = "/db/neo4j/query/v2";

async fn http_only_connector(server: &MockServer) -> GraphStoreConnector {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"statement": cypher::CONNECTIVITY_CHECK})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"fields": ["test"], "values": [[1]]}
        })))
        .mount(server)
        .await;

    let mut config = unreachable_graph_config();
    config.http_uri = Some(server.uri());
    GraphStoreConnector::connect(config).await
}

#[tokio::test]
async fn test_graph_route_is_served_over_http_fallback() {
    let mock_server = MockServer::start().await;
    let connector = http_only_connector(&mock_server).await;
    assert_eq!(connector.state().transport, Transport::HttpFallback);

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({
            "statement": cypher::SEARCH_NODES,
            "parameters": {"keyword": "panel"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "fields": ["n", "labels", "node_id"],
                "values": [[{"name": "Solar Panel X", "description": "Flagship panel"}, ["Product"], 1]]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"parameters": {"node_id": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "fields": ["relationships", "nodes"],
                "values": [[
                    [{"type": "SUCCEEDED_BY", "props": {"description": "since 2023"}}],
                    [
                        {"id": 1, "labels": ["Product"], "props": {"name": "Solar Panel X"}},
                        {"id": 2, "labels": ["Product"], "props": {"name": "Y300"}}
                    ]
                ]]
            }
        })))
        .mount(&mock_server)
        .await;

    let vector = Arc::new(StaticVectorStore::new(Vec::new()));
    let retriever = HybridRetriever::new(
        vector.clone(),
        Arc::new(CannedCompletion::new("ok")),
        Arc::new(TextFileLoader::new(1000, 200).unwrap()),
    )
    .with_graph(Arc::new(connector), None);

    // "related" matches no mock; that search fails and is ignored.
    let retrieval = retriever.retrieve("How is the panel related?").await;

    assert_eq!(retrieval.route, Route::Graph);
    assert_eq!(vector.retrieval_count(), 0);
    assert_eq!(retrieval.chunks.len(), 1);
    assert_eq!(retrieval.chunks[0].origin, Origin::Graph);
    assert_eq!(
        retrieval.chunks[0].text,
        "Knowledge Graph Context:\n[Product] Solar Panel X: Flagship panel\n  -> SUCCEEDED_BY: since 2023"
    );
}

#[tokio::test]
async fn test_unreachable_graph_store_degrades_to_vector_only() {
    let connector = GraphStoreConnector::connect(unreachable_graph_config()).await;
    assert_eq!(connector.state().transport, Transport::Unavailable);
    assert!(!connector.is_connected());
    assert!(connector.search_nodes("panel", 5).await.is_empty());

    let retriever = HybridRetriever::new(
        Arc::new(StaticVectorStore::new(Vec::new())),
        Arc::new(CannedCompletion::new("ok")),
        Arc::new(TextFileLoader::new(1000, 200).unwrap()),
    )
    .with_graph(Arc::new(connector), None);

    let retrieval = retriever.retrieve("How is X200 related to Y300?").await;

    assert_eq!(retrieval.route, Route::Graph);
    assert!(retrieval.chunks.is_empty());
    assert!(!retriever.is_graph_available());
}

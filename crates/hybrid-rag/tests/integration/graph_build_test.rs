use std::sync::Arc;

use hybrid_rag::test_utils::{InMemoryGraphStore, ScriptedExtractor};
use hybrid_rag::{BuildStats, Document, GraphBuilder, GraphStoreConnector};
use pretty_assertions::assert_eq;

use super::test_utils::{graph_document, node, relationship, unreachable_graph_config};

#[tokio::test]
async fn test_entity_named_twice_is_created_once() {
    let store = InMemoryGraphStore::new();
    let extractor = ScriptedExtractor::new(vec![
        graph_document(
            vec![node("Solar Panel X", "Product"), node("SunCorp", "Company")],
            vec![relationship("Solar Panel X", "SunCorp", "manufactured by")],
        ),
        graph_document(
            vec![node("solar panel x", "Product"), node("Y300", "Product")],
            vec![relationship("SOLAR PANEL X", "Y300", "succeeded-by")],
        ),
    ]);
    let builder = GraphBuilder::new(Arc::new(store.clone()), Some(Arc::new(extractor)));

    let stats = builder
        .build(&[Document::new("catalog page"), Document::new("history page")])
        .await;

    assert_eq!(stats, BuildStats { entity_count: 3, relation_count: 2 });

    let nodes = store.nodes();
    let panels: Vec<_> = nodes.iter().filter(|n| n.name() == Some("Solar Panel X")).collect();
    assert_eq!(panels.len(), 1);

    let relationships = store.relationships();
    assert!(relationships.iter().all(|r| r.from == panels[0].id));

    let types: Vec<String> = relationships.into_iter().map(|r| r.rel_type).collect();
    assert_eq!(types, vec!["MANUFACTURED_BY".to_string(), "SUCCEEDED_BY".to_string()]);
}

#[tokio::test]
async fn test_relationship_to_unknown_entity_is_dropped() {
    let store = InMemoryGraphStore::new();
    let extractor = ScriptedExtractor::new(vec![graph_document(
        vec![node("Inverter Z", "Product")],
        vec![relationship("Inverter Z", "Battery Q", "PAIRS_WITH")],
    )]);
    let builder = GraphBuilder::new(Arc::new(store.clone()), Some(Arc::new(extractor)));

    let stats = builder.build(&[Document::new("inverter notes")]).await;

    assert_eq!(stats, BuildStats { entity_count: 1, relation_count: 0 });
    assert!(store.relationships().is_empty());
}

#[tokio::test]
async fn test_unreachable_graph_store_builds_nothing() {
    let connector = GraphStoreConnector::connect(unreachable_graph_config()).await;
    let extractor = Arc::new(ScriptedExtractor::new(vec![graph_document(
        vec![node("Solar Panel X", "Product")],
        Vec::new(),
    )]));
    let builder = GraphBuilder::new(Arc::new(connector), Some(extractor.clone()));

    let stats = builder.build(&[Document::new("catalog page")]).await;

    assert_eq!(stats, BuildStats::default());
    assert!(extractor.received_counts().is_empty());
}

use std::sync::Arc;

use hybrid_rag::test_utils::{CannedCompletion, InMemoryGraphStore, ScriptedExtractor};
use hybrid_rag::{CoreError, HybridRetriever, IngestSummary, Origin, Route, TextFileLoader};
use pretty_assertions::assert_eq;

use super::test_utils::{graph_document, in_memory_vector_store, node, relationship, temp_file};

fn solar_extractor() -> ScriptedExtractor {
    ScriptedExtractor::new(vec![graph_document(
        vec![node("Solar Panel X", "Product"), node("SunCorp", "Company")],
        vec![relationship("Solar Panel X", "SunCorp", "made by")],
    )])
}

#[tokio::test]
async fn test_ingest_then_answer_hybrid_query() {
    let graph = InMemoryGraphStore::new();
    let completion = Arc::new(CannedCompletion::new("The Solar Panel X is made by SunCorp."));
    let retriever = HybridRetriever::new(
        in_memory_vector_store(),
        completion.clone(),
        Arc::new(TextFileLoader::new(200, 20).unwrap()),
    )
    .with_graph(Arc::new(graph.clone()), Some(Arc::new(solar_extractor())));

    let catalog = temp_file("md", "# Catalog\n\nThe Solar Panel X is built by SunCorp in Lyon.");
    let prices = temp_file("csv", "product,price\nSolar Panel X,300 EUR\nInverter Z,120 EUR\n");

    let summary = retriever
        .ingest(&[catalog.path().to_path_buf(), prices.path().to_path_buf()])
        .await
        .unwrap();

    assert_eq!(
        summary,
        IngestSummary {
            vector_chunks: 3,
            graph_entities: 2,
            graph_relations: 1
        }
    );
    assert_eq!(graph.relationships()[0].rel_type, "MADE_BY");

    let answer = retriever.answer("Tell me about the Solar Panel X").await.unwrap();

    assert_eq!(answer.route, Route::Hybrid);
    let last = answer.chunks.last().unwrap();
    assert_eq!(last.origin, Origin::Graph);
    assert!(last.text.contains("[Product] Solar Panel X"));
    assert!(last.text.contains("  -> MADE_BY"));
    assert!(answer.chunks[..answer.chunks.len() - 1]
        .iter()
        .all(|c| c.origin == Origin::Vector));

    let prompts = completion.prompts();
    assert!(prompts[0].0.contains("using hybrid retrieval strategy"));
    assert!(prompts[0].0.contains("Knowledge Graph Context:"));
    assert_eq!(answer.metrics.trace_id.len(), 36);
}

#[tokio::test]
async fn test_vector_only_retriever_ignores_graph_cues() {
    let retriever = HybridRetriever::new(
        in_memory_vector_store(),
        Arc::new(CannedCompletion::new("ok")),
        Arc::new(TextFileLoader::new(1000, 200).unwrap()),
    );

    let notes = temp_file("txt", "The Y300 replaced the X200 in 2023.");
    let summary = retriever.ingest(&[notes.path().to_path_buf()]).await.unwrap();
    assert_eq!(summary.graph_entities, 0);

    let retrieval = retriever.retrieve("How is the X200 related to the Y300?").await;

    assert_eq!(retrieval.route, Route::Graph);
    assert!(retrieval.chunks.is_empty());
}

#[tokio::test]
async fn test_unsupported_file_fails_ingest() {
    let retriever = HybridRetriever::new(
        in_memory_vector_store(),
        Arc::new(CannedCompletion::new("ok")),
        Arc::new(TextFileLoader::new(1000, 200).unwrap()),
    );

    let pdf = temp_file("pdf", "%PDF-1.4");

    assert!(matches!(
        retriever.ingest(&[pdf.path().to_path_buf()]).await,
        Err(CoreError::UnsupportedFormat(_))
    ));
}

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, field, info, instrument, warn, Span};

use crate::config::RagConfig;
use crate::data::{Chunk, CoreError, Document, Metadata, Route, TraceContext};
use crate::embedding::create_embedding_service;
use crate::graph::{synthesize_context, GraphBuilder, GraphContextOptions, GraphStoreConnector};
use crate::llm::{create_completion, LlmEntityExtractor};
use crate::loader::TextFileLoader;
use crate::router::{KeywordRouter, QueryClassifier};
use crate::services::metrics::{millis, QueryMetrics};
use crate::traits::{
    DocumentLoader, EntityExtractor, GraphStore, TextCompletion, VectorIndex, VectorStore,
};
use crate::vector::{InMemoryVectorIndex, QdrantConfig, QdrantIndex, VectorStoreConnector};

/// Context handed to generation when retrieval found nothing.
pub const NO_CONTEXT: &str = "No relevant information found.";

/// `source` metadata of the synthesized graph chunk.
pub const GRAPH_CHUNK_SOURCE: &str = "knowledge_graph";

#[derive(Debug, Clone)]
pub struct RetrieverOptions {
    /// Number of chunks requested from the vector store.
    pub top_k: usize,
    pub graph_context: GraphContextOptions,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            top_k: 4,
            graph_context: GraphContextOptions::default(),
        }
    }
}

/// Wall time spent in each store; `None` when the store was not consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StoreTimings {
    pub vector: Option<Duration>,
    pub graph: Option<Duration>,
}

/// Outcome of one retrieval: ordered chunks, the route taken and timings.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub chunks: Vec<Chunk>,
    pub route: Route,
    pub timings: StoreTimings,
}

/// Counts reported by an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub vector_chunks: usize,
    pub graph_entities: usize,
    pub graph_relations: usize,
}

/// A generated answer with the retrieval that backed it.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub route: Route,
    pub chunks: Vec<Chunk>,
    pub metrics: QueryMetrics,
}

/// Routes each query to the vector index, the knowledge graph or both, and
/// turns the merged context into an answer.
///
/// Store failures never surface from `retrieve`: an unreachable store just
/// contributes no chunks.
pub struct HybridRetriever {
    classifier: Arc<dyn QueryClassifier>,
    vector_store: Arc<dyn VectorStore>,
    graph_store: Option<Arc<dyn GraphStore>>,
    graph_builder: Option<GraphBuilder>,
    completion: Arc<dyn TextCompletion>,
    loader: Arc<dyn DocumentLoader>,
    options: RetrieverOptions,
}

impl HybridRetriever {
    /// A vector-only retriever using the default keyword router.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        completion: Arc<dyn TextCompletion>,
        loader: Arc<dyn DocumentLoader>,
    ) -> Self {
        Self {
            classifier: Arc::new(KeywordRouter::default()),
            vector_store,
            graph_store: None,
            graph_builder: None,
            completion,
            loader,
            options: RetrieverOptions::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn QueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Enables graph retrieval, and graph building when an extractor is given.
    pub fn with_graph(
        mut self,
        graph_store: Arc<dyn GraphStore>,
        extractor: Option<Arc<dyn EntityExtractor>>,
    ) -> Self {
        self.graph_builder = Some(GraphBuilder::new(graph_store.clone(), extractor));
        self.graph_store = Some(graph_store);
        self
    }

    pub fn with_options(mut self, options: RetrieverOptions) -> Self {
        self.options = options;
        self
    }

    /// Wires every collaborator from configuration.
    ///
    /// Only configuration problems fail; an unreachable graph store leaves
    /// the retriever running on the vector index alone.
    pub async fn from_config(config: &RagConfig) -> Result<Self, CoreError> {
        let embedder = create_embedding_service(&config.embedding)?;

        let index: Arc<dyn VectorIndex> = match &config.vector.qdrant_url {
            Some(url) => {
                info!("Using Qdrant collection '{}' at {}", config.vector.collection, url);
                Arc::new(QdrantIndex::new(QdrantConfig {
                    url: url.clone(),
                    api_key: config.vector.qdrant_api_key.clone(),
                    collection: config.vector.collection.clone(),
                    timeout: config.vector.timeout,
                })?)
            }
            None => {
                info!("QDRANT_URL not set, using an in-memory vector index");
                Arc::new(InMemoryVectorIndex::new())
            }
        };

        let vector_store = VectorStoreConnector::new(embedder, index)
            .with_score_threshold(config.vector.score_threshold);
        let completion = create_completion(&config.llm)?;
        let loader = TextFileLoader::from_config(&config.chunking)?;

        let mut retriever = Self::new(Arc::new(vector_store), completion.clone(), Arc::new(loader))
            .with_options(RetrieverOptions {
                top_k: config.vector.top_k,
                ..RetrieverOptions::default()
            });

        if config.graph.enabled {
            let connector = GraphStoreConnector::connect(config.graph.clone()).await;
            if !connector.is_connected() {
                warn!("Graph store unavailable; continuing with vector retrieval only");
            }
            let extractor: Arc<dyn EntityExtractor> = Arc::new(LlmEntityExtractor::new(completion));
            retriever = retriever.with_graph(Arc::new(connector), Some(extractor));
        }

        Ok(retriever)
    }

    pub fn classify(&self, query: &str) -> Route {
        self.classifier.classify(query)
    }

    /// True when graph support is enabled and its store is reachable.
    pub fn is_graph_available(&self) -> bool {
        self.graph_store.as_ref().map_or(false, |g| g.is_connected())
    }

    /// Collects context for `query` along its route.
    ///
    /// Vector and graph lookups run concurrently; vector chunks always come
    /// first, in the order the index ranked them, followed by at most one
    /// graph chunk.
    #[instrument(skip(self, query), fields(query_length = query.len(), route = field::Empty))]
    pub async fn retrieve(&self, query: &str) -> Retrieval {
        let route = self.classifier.classify(query);
        Span::current().record("route", route.as_str());
        debug!("Query routed to {}", route);

        let vector = async {
            if !route.uses_vector() {
                return (Vec::new(), None);
            }
            let start = Instant::now();
            let chunks = match self.vector_store.retrieve(query, self.options.top_k).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!("Vector retrieval failed: {}", e);
                    Vec::new()
                }
            };
            (chunks, Some(start.elapsed()))
        };

        let graph = async {
            match &self.graph_store {
                Some(store) if route.uses_graph() && store.is_connected() => {
                    let start = Instant::now();
                    let context =
                        synthesize_context(store.as_ref(), query, &self.options.graph_context).await;
                    (context, Some(start.elapsed()))
                }
                _ => (None, None),
            }
        };

        let ((mut chunks, vector_time), (graph_context, graph_time)) = tokio::join!(vector, graph);

        if let Some(text) = graph_context {
            let mut metadata = Metadata::new();
            metadata.insert("source".to_string(), GRAPH_CHUNK_SOURCE.to_string());
            chunks.push(Chunk::graph(text, metadata));
        }

        Retrieval {
            chunks,
            route,
            timings: StoreTimings {
                vector: vector_time,
                graph: graph_time,
            },
        }
    }

    /// Asks the completion service to answer from the given chunks.
    pub async fn generate_answer(
        &self,
        query: &str,
        chunks: &[Chunk],
        route: Route,
    ) -> Result<String, CoreError> {
        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let context = if context.is_empty() { NO_CONTEXT } else { context.as_str() };

        let system_prompt = format!(
            "You are an intelligent assistant using {} retrieval strategy. \
             Use the provided context to answer the user's question.\n\nContext:\n{}",
            route, context
        );

        self.completion.complete(&system_prompt, query).await
    }

    /// Retrieves, generates and reports metrics for one query.
    #[instrument(skip(self, query), fields(trace_id = field::Empty))]
    pub async fn answer(&self, query: &str) -> Result<Answer, CoreError> {
        let trace = TraceContext::new();
        trace.record_on_current_span();
        let start = Instant::now();

        let retrieval = self.retrieve(query).await;
        let text = self
            .generate_answer(query, &retrieval.chunks, retrieval.route)
            .await?;

        let metrics = QueryMetrics {
            timestamp: chrono::Utc::now(),
            trace_id: trace.trace_id,
            route: retrieval.route,
            latency_ms: millis(start.elapsed()),
            query_length: query.chars().count(),
            response_length: text.chars().count(),
            vector_store_latency_ms: retrieval.timings.vector.map(millis),
            graph_store_latency_ms: retrieval.timings.graph.map(millis),
        };
        metrics.record();

        Ok(Answer {
            text,
            route: retrieval.route,
            chunks: retrieval.chunks,
            metrics,
        })
    }

    /// Loads, splits and indexes files, then builds the graph from the
    /// loaded documents when graph support is available.
    ///
    /// Load and indexing failures are returned; graph building never fails.
    #[instrument(skip(self, paths), fields(files = paths.len(), trace_id = field::Empty))]
    pub async fn ingest(&self, paths: &[PathBuf]) -> Result<IngestSummary, CoreError> {
        TraceContext::new().record_on_current_span();
        let loaded = try_join_all(paths.iter().map(|path| self.loader.load_document(path))).await?;
        let documents: Vec<Document> = loaded.into_iter().flatten().collect();

        let chunks = self.loader.split_into_chunks(&documents);
        let mut summary = IngestSummary {
            vector_chunks: self.vector_store.index(&chunks).await?,
            ..IngestSummary::default()
        };

        if let Some(builder) = &self.graph_builder {
            if self.is_graph_available() {
                info!("Building knowledge graph from {} documents", documents.len());
                let stats = builder.build(&documents).await;
                summary.graph_entities = stats.entity_count;
                summary.graph_relations = stats.relation_count;
            }
        }

        info!(
            "Ingested {} documents: {} chunks, {} entities, {} relations",
            documents.len(),
            summary.vector_chunks,
            summary.graph_entities,
            summary.graph_relations
        );
        Ok(summary)
    }
}

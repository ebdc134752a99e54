use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::data::{Chunk, CoreError, Document};
use crate::traits::{EntityExtractor, GraphDocument, TextCompletion, VectorStore};

/// Extractor that returns a fixed set of graph documents regardless of input.
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    documents: Vec<GraphDocument>,
    failure: Option<String>,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedExtractor {
    pub fn new(documents: Vec<GraphDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// An extractor whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of documents received by each call so far.
    pub fn received_counts(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EntityExtractor for ScriptedExtractor {
    async fn extract_graph(&self, documents: &[Document]) -> Result<Vec<GraphDocument>, CoreError> {
        self.calls.lock().push(documents.len());
        match &self.failure {
            Some(message) => Err(CoreError::Extraction(message.clone())),
            None => Ok(self.documents.clone()),
        }
    }
}

/// Completion service that answers every prompt with the same text.
#[derive(Debug)]
pub struct CannedCompletion {
    answer: String,
    prompts: Mutex<Vec<(String, String)>>,
}

impl CannedCompletion {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `(system_prompt, user_query)` pairs received so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextCompletion for CannedCompletion {
    async fn complete(&self, system_prompt: &str, user_query: &str) -> Result<String, CoreError> {
        self.prompts
            .lock()
            .push((system_prompt.to_string(), user_query.to_string()));
        Ok(self.answer.clone())
    }
}

/// Vector store returning preset chunks, optionally slowly or not at all.
#[derive(Debug, Default)]
pub struct StaticVectorStore {
    chunks: Vec<Chunk>,
    delay: Option<Duration>,
    failing: bool,
    indexed: Mutex<Vec<Chunk>>,
    retrievals: Mutex<usize>,
}

impl StaticVectorStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            ..Self::default()
        }
    }

    /// A store whose every call fails as unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Delays each `retrieve` by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn indexed(&self) -> Vec<Chunk> {
        self.indexed.lock().clone()
    }

    pub fn retrieval_count(&self) -> usize {
        *self.retrievals.lock()
    }
}

#[async_trait]
impl VectorStore for StaticVectorStore {
    async fn index(&self, chunks: &[Chunk]) -> Result<usize, CoreError> {
        if self.failing {
            return Err(CoreError::vector_unavailable("connection refused"));
        }
        self.indexed.lock().extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<Chunk>, CoreError> {
        *self.retrievals.lock() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(CoreError::vector_unavailable("connection refused"));
        }
        Ok(self.chunks.iter().take(k).cloned().collect())
    }
}

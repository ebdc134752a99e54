//! DocumentLoader trait: file parsing and chunking collaborator

use async_trait::async_trait;
use std::path::Path;

use crate::data::{Chunk, CoreError, Document};

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Parses one file into documents.
    async fn load_document(&self, path: &Path) -> Result<Vec<Document>, CoreError>;

    /// Splits documents into indexable chunks, preserving their metadata.
    fn split_into_chunks(&self, documents: &[Document]) -> Vec<Chunk>;
}

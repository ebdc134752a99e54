//! File loading and chunking for ingestion

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use text_splitter::{Characters, ChunkConfig, TextSplitter};
use tracing::{debug, instrument};

use crate::config::ChunkingConfig;
use crate::data::{Chunk, CoreError, Document};
use crate::traits::DocumentLoader;

/// Loads plain text, Markdown, JSON and CSV files.
///
/// PDF files are rejected with `UnsupportedFormat`; extracting their text is
/// left to a dedicated loader.
pub struct TextFileLoader {
    splitter: TextSplitter<Characters>,
}

impl TextFileLoader {
    /// Chunks hold at most `chunk_size` characters, consecutive chunks
    /// sharing up to `chunk_overlap`. The overlap must be smaller than the size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, CoreError> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| {
                CoreError::Configuration(format!(
                    "invalid chunking (size {}, overlap {}): {}",
                    chunk_size, chunk_overlap, e
                ))
            })?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, CoreError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    fn json_documents(content: &str, source: &str) -> Result<Vec<Document>, CoreError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| CoreError::DocumentLoad(format!("{}: invalid JSON: {}", source, e)))?;

        let render = |value: &Value| match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };

        Ok(match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Document::new(render(item))
                        .with_metadata("source", source)
                        .with_metadata("row", i.to_string())
                })
                .collect(),
            other => vec![Document::new(render(&other)).with_metadata("source", source)],
        })
    }

    fn csv_documents(content: &str, source: &str) -> Result<Vec<Document>, CoreError> {
        let load_error = |e: csv::Error| CoreError::DocumentLoad(format!("{}: invalid CSV: {}", source, e));

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = reader.headers().map_err(load_error)?.clone();

        let mut documents = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(load_error)?;
            let lines: Vec<String> = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(column, value)| format!("{}: {}", column, value))
                .collect();
            if lines.is_empty() {
                continue;
            }
            documents.push(
                Document::new(lines.join("\n"))
                    .with_metadata("source", source)
                    .with_metadata("row", i.to_string()),
            );
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentLoader for TextFileLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load_document(&self, path: &Path) -> Result<Vec<Document>, CoreError> {
        let source = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if extension == "pdf" {
            return Err(CoreError::UnsupportedFormat(format!(
                "{}: PDF text extraction is not built in",
                source
            )));
        }
        if !matches!(extension.as_str(), "txt" | "text" | "md" | "markdown" | "json" | "csv") {
            return Err(CoreError::UnsupportedFormat(format!(
                "{}: unsupported extension '{}'",
                source, extension
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::DocumentLoad(format!("{}: {}", source, e)))?;

        let documents = match extension.as_str() {
            "json" => Self::json_documents(&content, &source)?,
            "csv" => Self::csv_documents(&content, &source)?,
            _ => vec![Document::new(content).with_metadata("source", source.as_str())],
        };

        debug!("Loaded {} documents", documents.len());
        Ok(documents)
    }

    fn split_into_chunks(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.splitter
                    .chunks(&doc.content)
                    .enumerate()
                    .map(move |(i, piece)| {
                        let mut metadata = doc.metadata.clone();
                        metadata.insert("chunk".to_string(), i.to_string());
                        Chunk::vector(piece, metadata)
                    })
            })
            .collect()
    }
}

//! Error types for the hybrid retrieval core

use thiserror::Error;

use crate::data::types::StoreKind;

/// Base error type for core operations.
///
/// Only `Configuration` is fatal; store failures are absorbed at the
/// connector boundary and surface as empty results.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{store} store unavailable: {reason}")]
    StoreUnavailable {
        store: StoreKind,
        reason: String,
    },

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Graph extraction error: {0}")]
    Extraction(String),

    #[error("Answer generation error: {0}")]
    Generation(String),

    #[error("Document loading error: {0}")]
    DocumentLoad(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization/Deserialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn vector_unavailable(reason: impl Into<String>) -> Self {
        CoreError::StoreUnavailable {
            store: StoreKind::Vector,
            reason: reason.into(),
        }
    }

    pub fn graph_unavailable(reason: impl Into<String>) -> Self {
        CoreError::StoreUnavailable {
            store: StoreKind::Graph,
            reason: reason.into(),
        }
    }

    /// True for errors that must halt initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Configuration(_))
    }
}

/// Error type for a single graph store round trip.
#[derive(Error, Debug)]
pub enum GraphStoreError {
    #[error("Graph database connection error: {0}")]
    Connection(String),
    #[error("Graph query execution error: {0}")]
    QueryExecution(String),
    #[error("Data mapping error from graph result: {0}")]
    Mapping(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(feature = "bolt")]
impl From<neo4rs::Error> for GraphStoreError {
    fn from(error: neo4rs::Error) -> Self {
        GraphStoreError::QueryExecution(error.to_string())
    }
}

impl From<reqwest::Error> for GraphStoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GraphStoreError::Connection(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            GraphStoreError::Connection(format!("Connection error: {}", error))
        } else if error.is_decode() {
            GraphStoreError::Mapping(format!("Failed to parse response: {}", error))
        } else {
            GraphStoreError::QueryExecution(format!("HTTP error: {}", error))
        }
    }
}

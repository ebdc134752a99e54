use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::data::{CoreError, Document};
use crate::traits::{
    EntityExtractor, ExtractedNode, ExtractedRelationship, GraphDocument, TextCompletion,
};

const EXTRACTION_PROMPT: &str = "You extract a knowledge graph from text. \
Identify the entities (products, companies, people, places, concepts) and the relationships between them. \
Reply with a single JSON object and nothing else, shaped as \
{\"nodes\": [{\"id\": \"entity name\", \"type\": \"EntityType\", \"description\": \"optional short description\"}], \
\"relationships\": [{\"source\": \"entity name\", \"target\": \"entity name\", \"type\": \"RELATION_TYPE\"}]}. \
Use the exact entity names in relationships.";

#[derive(Debug, Default, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    nodes: Vec<ExtractedNode>,
    #[serde(default)]
    relationships: Vec<ExtractedRelationship>,
}

/// Entity extraction by prompting a chat model for JSON.
///
/// Documents are sent one at a time. A document whose completion fails or
/// does not parse is logged and skipped.
pub struct LlmEntityExtractor {
    completion: Arc<dyn TextCompletion>,
}

impl LlmEntityExtractor {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    fn parse(reply: &str) -> Result<ExtractionPayload, CoreError> {
        // Replies may wrap the object in prose or code fences.
        let start = reply.find('{');
        let end = reply.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &reply[start..=end],
            _ => return Err(CoreError::Extraction("no JSON object in reply".to_string())),
        };

        let mut payload: ExtractionPayload =
            serde_json::from_str(json).map_err(|e| CoreError::Extraction(e.to_string()))?;
        payload.nodes.retain(|n| !n.id.trim().is_empty());
        payload
            .relationships
            .retain(|r| !r.source.trim().is_empty() && !r.target.trim().is_empty());
        Ok(payload)
    }
}

#[async_trait]
impl EntityExtractor for LlmEntityExtractor {
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    async fn extract_graph(&self, documents: &[Document]) -> Result<Vec<GraphDocument>, CoreError> {
        let mut graph_documents = Vec::with_capacity(documents.len());

        for document in documents {
            let reply = match self.completion.complete(EXTRACTION_PROMPT, &document.content).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Extraction failed for {}: {}", document.source(), e);
                    continue;
                }
            };

            match Self::parse(&reply) {
                Ok(payload) => {
                    debug!(
                        "Extracted {} nodes and {} relationships from {}",
                        payload.nodes.len(),
                        payload.relationships.len(),
                        document.source()
                    );
                    graph_documents.push(GraphDocument {
                        nodes: payload.nodes,
                        relationships: payload.relationships,
                        source_metadata: document.metadata.clone(),
                    });
                }
                Err(e) => warn!("Unparseable extraction for {}: {}", document.source(), e),
            }
        }

        Ok(graph_documents)
    }
}

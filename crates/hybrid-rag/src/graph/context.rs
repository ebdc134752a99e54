//! Keyword extraction and graph context synthesis for graph-routed queries

use std::collections::HashSet;
use tracing::debug;

use crate::data::NodeId;
use crate::traits::GraphStore;

pub const CONTEXT_HEADER: &str = "Knowledge Graph Context:";

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "who", "what", "where", "when", "why", "how", "which",
    "that", "this", "in", "on", "at", "to", "for", "of", "and", "or", "with", "from", "by",
];

/// Limits applied while walking the graph for context.
#[derive(Debug, Clone)]
pub struct GraphContextOptions {
    pub max_keywords: usize,
    pub seeds_per_keyword: usize,
    pub neighborhood_depth: usize,
    pub neighborhood_rows: usize,
    pub max_lines: usize,
}

impl Default for GraphContextOptions {
    fn default() -> Self {
        Self {
            max_keywords: 10,
            seeds_per_keyword: 5,
            neighborhood_depth: 1,
            neighborhood_rows: 5,
            max_lines: 20,
        }
    }
}

/// Lowercased words of more than two characters that are not stop words,
/// deduplicated in order of first appearance and capped at `max`.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();

    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .filter(|w| seen.insert(*w))
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Walks the graph from keyword hits and renders what it finds as text.
///
/// Returns `None` when the store is unavailable or nothing matched.
pub async fn synthesize_context(
    store: &dyn GraphStore,
    question: &str,
    options: &GraphContextOptions,
) -> Option<String> {
    if !store.is_connected() {
        return None;
    }

    let keywords = extract_keywords(question, options.max_keywords);
    debug!("Graph keywords: {:?}", keywords);

    let mut lines: Vec<String> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();

    'keywords: for keyword in &keywords {
        for hit in store.search_nodes(keyword, options.seeds_per_keyword).await {
            if lines.len() >= options.max_lines {
                break 'keywords;
            }
            if !seen.insert(hit.node_id) {
                continue;
            }

            let name = hit.property("name").unwrap_or_else(|| "Unknown".to_string());
            let mut line = format!("[{}] {}", hit.labels.join("/"), name);
            if let Some(description) = hit.property("description").filter(|d| !d.is_empty()) {
                line.push_str(": ");
                line.push_str(&description);
            }
            lines.push(line);

            let rows = store
                .get_neighborhood(hit.node_id, options.neighborhood_depth, options.neighborhood_rows)
                .await;
            for row in rows.iter().take(options.neighborhood_rows) {
                for rel in &row.relationships {
                    let mut line = format!("  -> {}", rel.rel_type);
                    if let Some(description) = rel
                        .props
                        .get("description")
                        .and_then(crate::traits::graph_store::value_as_text)
                        .filter(|d| !d.is_empty())
                    {
                        line.push_str(": ");
                        line.push_str(&description);
                    }
                    lines.push(line);
                }
            }
        }
    }

    if lines.is_empty() {
        return None;
    }

    lines.truncate(options.max_lines);
    Some(format!("{}\n{}", CONTEXT_HEADER, lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metadata;
    use crate::test_utils::InMemoryGraphStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_keywords_filters_and_orders() {
        let keywords = extract_keywords("What is the history of the Solar Panel X and the solar market?", 10);
        assert_eq!(keywords, vec!["history", "solar", "panel", "market"]);
    }

    #[test]
    fn test_extract_keywords_caps_count() {
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        let keywords = extract_keywords(text, 10);
        assert_eq!(keywords.len(), 10);
        assert_eq!(keywords[0], "alpha");
        assert_eq!(keywords[9], "juliet");
    }

    #[test]
    fn test_extract_keywords_handles_accents() {
        assert_eq!(extract_keywords("Quel est l'historique énergétique", 10), vec!["quel", "est", "historique", "énergétique"]);
    }

    fn props(name: &str, description: Option<&str>) -> Metadata {
        let mut props = Metadata::new();
        props.insert("name".to_string(), name.to_string());
        if let Some(d) = description {
            props.insert("description".to_string(), d.to_string());
        }
        props
    }

    #[tokio::test]
    async fn test_context_lists_nodes_and_relationships() {
        let store = InMemoryGraphStore::new();
        let panel = store
            .create_node("Product", props("Solar Panel X", Some("High efficiency panel")))
            .await
            .unwrap();
        let maker = store.create_node("Company", props("SunCorp", None)).await.unwrap();
        let mut rel_props = Metadata::new();
        rel_props.insert("description".to_string(), "built in 2020".to_string());
        store.create_relationship(panel, maker, "MANUFACTURED_BY", rel_props).await;

        let context = synthesize_context(&store, "history of solar panel", &GraphContextOptions::default())
            .await
            .unwrap();

        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines[0], CONTEXT_HEADER);
        assert_eq!(lines[1], "[Product] Solar Panel X: High efficiency panel");
        assert_eq!(lines[2], "  -> MANUFACTURED_BY: built in 2020");
        // The panel matches both "solar" and "panel" but is listed once.
        assert_eq!(context.matches("Solar Panel X").count(), 1);
    }

    #[tokio::test]
    async fn test_context_is_capped() {
        let store = InMemoryGraphStore::new();
        for i in 0..30 {
            store
                .create_node("Product", props(&format!("panel model {}", i), None))
                .await;
        }

        let options = GraphContextOptions {
            seeds_per_keyword: 50,
            ..GraphContextOptions::default()
        };
        let context = synthesize_context(&store, "panel", &options).await.unwrap();
        assert_eq!(context.lines().count(), 21);
    }

    #[tokio::test]
    async fn test_no_matches_yields_none() {
        let store = InMemoryGraphStore::new();
        store.create_node("Product", props("Inverter", None)).await;

        assert!(synthesize_context(&store, "battery warranty", &GraphContextOptions::default())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_yields_none() {
        let store = InMemoryGraphStore::unavailable();
        assert!(synthesize_context(&store, "solar panel", &GraphContextOptions::default())
            .await
            .is_none());
    }
}

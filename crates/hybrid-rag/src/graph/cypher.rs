//! Cypher statements issued by the graph connector

/// Connectivity check run against every transport before it is adopted.
pub const CONNECTIVITY_CHECK: &str = "RETURN 1 AS test";

/// Case-insensitive substring match over every property of every node.
pub const SEARCH_NODES: &str = "MATCH (n) \
     WHERE any(key IN keys(n) WHERE toLower(toString(n[key])) CONTAINS toLower($keyword)) \
     RETURN properties(n) AS n, labels(n) AS labels, id(n) AS node_id \
     LIMIT $limit";

/// Label used when an extracted entity type has no usable characters.
pub const FALLBACK_LABEL: &str = "Entity";

/// Relationship type used when normalization leaves nothing.
pub const FALLBACK_RELATIONSHIP: &str = "RELATED_TO";

pub fn create_node(label: &str) -> String {
    format!(
        "CREATE (n:`{}` $props) RETURN id(n) AS node_id",
        sanitize_label(label)
    )
}

pub fn create_relationship(rel_type: &str) -> String {
    format!(
        "MATCH (a), (b) WHERE id(a) = $from_id AND id(b) = $to_id \
         CREATE (a)-[r:`{}` $props]->(b) RETURN type(r) AS rel_type",
        normalize_relationship_type(rel_type)
    )
}

/// Variable-length paths from a node; `depth` is clamped to at least one hop.
pub fn neighborhood(depth: usize) -> String {
    format!(
        "MATCH path = (n)-[*1..{}]-(m) WHERE id(n) = $node_id \
         RETURN [rel IN relationships(path) | {{type: type(rel), props: properties(rel)}}] AS relationships, \
         [node IN nodes(path) | {{id: id(node), labels: labels(node), props: properties(node)}}] AS nodes \
         LIMIT $limit",
        depth.max(1)
    )
}

/// Keeps letters, digits and `_` from any script; whitespace and `-`
/// become `_`. Everything else, backticks included, is dropped.
fn identifier_chars(raw: &str) -> impl Iterator<Item = char> + '_ {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
}

/// Labels cannot be parameterized, so only identifier characters survive.
pub fn sanitize_label(raw: &str) -> String {
    let label: String = identifier_chars(raw).collect();

    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}

/// Spaces become underscores and the result is uppercased:
/// `"manufactured by"` becomes `MANUFACTURED_BY`.
pub fn normalize_relationship_type(raw: &str) -> String {
    let normalized = identifier_chars(raw).collect::<String>().to_uppercase();

    if normalized.is_empty() {
        FALLBACK_RELATIONSHIP.to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relationship_type() {
        assert_eq!(normalize_relationship_type("manufactured by"), "MANUFACTURED_BY");
        assert_eq!(normalize_relationship_type("part of"), "PART_OF");
        assert_eq!(normalize_relationship_type("USES"), "USES");
        assert_eq!(normalize_relationship_type("  `drop` me "), "DROP_ME");
        assert_eq!(normalize_relationship_type("!!"), FALLBACK_RELATIONSHIP);
    }

    #[test]
    fn test_identifiers_keep_accents_and_hyphen_separators() {
        assert_eq!(normalize_relationship_type("fabriqué par"), "FABRIQUÉ_PAR");
        assert_eq!(normalize_relationship_type("succeeded-by"), "SUCCEEDED_BY");
        assert_eq!(normalize_relationship_type("lié\tà"), "LIÉ_À");
        assert_eq!(sanitize_label("Société"), "Société");
        assert_eq!(sanitize_label("Énergie`\u{7}"), "Énergie");
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Product"), "Product");
        assert_eq!(sanitize_label("Solar Panel"), "Solar_Panel");
        assert_eq!(sanitize_label("Bad`) DETACH DELETE n //"), "Bad_DETACH_DELETE_n_");
        assert_eq!(sanitize_label(""), FALLBACK_LABEL);
    }

    #[test]
    fn test_statements_embed_sanitized_identifiers() {
        assert_eq!(
            create_node("Product"),
            "CREATE (n:`Product` $props) RETURN id(n) AS node_id"
        );
        assert!(create_relationship("made by").contains("[r:`MADE_BY` $props]"));
    }

    #[test]
    fn test_neighborhood_depth() {
        assert!(neighborhood(2).contains("[*1..2]"));
        assert!(neighborhood(0).contains("[*1..1]"));
    }
}

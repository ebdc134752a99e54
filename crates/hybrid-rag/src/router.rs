//! Keyword routing of queries to a retrieval strategy
//!
//! Rules are checked in registration order and the first rule with a
//! matching pattern decides the route. The default rule set registers the
//! vector cues before the graph cues, so a query carrying both kinds of cue
//! is routed to [`Route::Vector`]. Queries with no cue fall back to
//! [`Route::Hybrid`].

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::data::Route;

/// Lexical cues: definitions, prices, specifications (English and French).
pub const VECTOR_PATTERNS: &[&str] = &[
    r"what is",
    r"define",
    r"price",
    r"prix",
    r"cost",
    r"tarif",
    r"spec",
    r"feature",
    r"combien",
    r"c'est quoi",
];

/// Relational cues: relations, history, influence (English and French).
pub const GRAPH_PATTERNS: &[&str] = &[
    r"related",
    r"history",
    r"evolution",
    r"connection",
    r"link",
    r"historique",
    r"lien",
    r"impact",
];

static DEFAULT_RULES: Lazy<Vec<RouteRule>> = Lazy::new(|| {
    vec![
        RouteRule::compile_lossy(Route::Vector, VECTOR_PATTERNS),
        RouteRule::compile_lossy(Route::Graph, GRAPH_PATTERNS),
    ]
});

/// Anything that can pick a route for a query.
///
/// Implementations must be pure: the same query always yields the same route.
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> Route;
}

/// An ordered set of patterns tagged with the route they select.
#[derive(Debug, Clone)]
pub struct RouteRule {
    route: Route,
    patterns: Vec<Regex>,
}

impl RouteRule {
    pub fn new(route: Route, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { route, patterns })
    }

    fn compile_lossy(route: Route, patterns: &[&str]) -> Self {
        Self {
            route,
            patterns: patterns.iter().filter_map(|p| Regex::new(p).ok()).collect(),
        }
    }

    fn first_match(&self, query: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(query))
            .map(|p| p.as_str())
    }
}

/// Regular-expression router over lower-cased queries.
#[derive(Debug, Clone)]
pub struct KeywordRouter {
    rules: Vec<RouteRule>,
}

impl KeywordRouter {
    /// Builds a router from rules checked in the given order.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Builds a router with one vector rule followed by one graph rule.
    pub fn with_patterns(vector: &[&str], graph: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RouteRule::new(Route::Vector, vector)?,
            RouteRule::new(Route::Graph, graph)?,
        ]))
    }
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.clone())
    }
}

impl QueryClassifier for KeywordRouter {
    fn classify(&self, query: &str) -> Route {
        let query = query.to_lowercase();
        for rule in &self.rules {
            if let Some(pattern) = rule.first_match(&query) {
                debug!(route = %rule.route, pattern, "Query matched routing pattern");
                return rule.route;
            }
        }
        Route::Hybrid
    }
}

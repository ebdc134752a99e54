//! Knowledge graph access: transports, the fallback-aware connector, graph
//! building from extracted entities and context synthesis for queries.

pub mod cypher;
mod transport;
mod http;
#[cfg(feature = "bolt")]
mod bolt;
mod connector;
mod builder;
pub mod context;

pub use transport::GraphTransport;
pub use http::{http_base_url, HttpTransport};
#[cfg(feature = "bolt")]
pub use bolt::{json_to_bolt, BoltTransport};
pub use connector::GraphStoreConnector;
pub use builder::{BuildStats, GraphBuilder, MAX_BUILD_DOCUMENTS};
pub use context::{extract_keywords, synthesize_context, GraphContextOptions};

//! In-memory fakes for the collaborator traits, usable from unit and
//! integration tests without a graph database, vector index or model.

pub mod fake_store;
pub use fake_store::InMemoryGraphStore;

pub mod fakes;
pub use fakes::*;

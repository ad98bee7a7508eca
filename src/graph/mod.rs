//! Knowledge graph module: triple extraction, population and context traversal.
//!
//! Text about a destination is turned into `(Node_1, Relation, Node_2)` triples
//! by the generation service, merged into a shared append-only graph store, and
//! later walked from a seed place to produce relation-chain sentences.

mod extraction;
mod normalize;
mod populate;
mod sqlite;
mod store;
mod traversal;

pub use extraction::{
    build_extraction_prompt, build_location_context, extract_triples, normalize_attributes,
    parse_triples, ContextItem, ExtractionOptions,
};
pub use normalize::normalize_identifier;
pub use populate::{ingest_destination, populate_graph, PopulateReport};
pub use sqlite::SqliteGraph;
pub use store::{lock_graph, open_store, shared, GraphStore, MemoryGraph, SharedGraph};
pub use traversal::{
    build_context, describe_context, relation_chain, NO_RELATIONSHIP_DATA,
};

use serde::{Deserialize, Serialize};

/// A graph node keyed by its canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Canonical key, see [`normalize_identifier`].
    pub id: String,
    /// Name as first seen in extracted text.
    pub display_name: String,
    /// Free-text category, e.g. `Attraction`, `Architect`.
    pub type_tag: String,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// A directed edge. At most one exists per ordered `(source_id, target_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub relation_label: String,
    /// JSON object text, `{}` when nothing usable was extracted.
    pub attributes: String,
}

impl Edge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation_label: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation_label: relation_label.into(),
            attributes: "{}".to_string(),
        }
    }

    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = attributes.into();
        self
    }
}

/// One extracted row before ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub node_1: String,
    pub relation: String,
    pub node_2: String,
    pub node_1_type: String,
    pub node_2_type: String,
    /// Already normalized by [`normalize_attributes`].
    pub attributes: String,
}

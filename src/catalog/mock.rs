//! In-memory catalog for tests and benchmarks
//!
//! Serves canned JSON for the three catalog operations and records every
//! call so tests can assert on fetch order and counts.
//!
//! # Example
//!
//! ```rust
//! use lineage_sync::catalog::{CatalogApi, MockCatalog};
//! use serde_json::json;
//!
//! let catalog = MockCatalog::new();
//! catalog.add_root(json!({"id": "s1", "path": ["s1"], "type": "CONTAINER", "containerType": "SPACE"}));
//! catalog.add_node(json!({"id": "s1", "path": ["s1"], "children": []}));
//!
//! assert_eq!(catalog.list_root_catalog().unwrap().len(), 1);
//! assert!(catalog.list_children("s1").unwrap().children.unwrap().is_empty());
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::types::{CatalogNode, RelationshipGraph};
use super::CatalogApi;
use crate::error::{LineageError, Result};

/// A recorded catalog call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Root,
    Children(String),
    Graph(String),
}

/// Failure to inject for a node id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Auth,
    Transport,
    Decode,
    NotFound,
}

impl MockFailure {
    fn to_error(self, node_id: &str) -> LineageError {
        match self {
            MockFailure::Auth => LineageError::Auth(format!("mock rejected {}", node_id)),
            MockFailure::Transport => {
                LineageError::transport(format!("mock connection reset on {}", node_id))
            }
            MockFailure::Decode => LineageError::Decode(format!("mock garbage for {}", node_id)),
            MockFailure::NotFound => LineageError::NotFound(node_id.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    root: Vec<Value>,
    nodes: HashMap<String, Value>,
    graphs: HashMap<String, RelationshipGraph>,
    failures: HashMap<String, MockFailure>,
    root_failure: Option<MockFailure>,
    calls: Vec<MockCall>,
}

/// Mock catalog service
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    state: Arc<RwLock<MockState>>,
}

impl MockCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the root listing
    pub fn add_root(&self, entry: Value) {
        self.state.write().unwrap().root.push(entry);
    }

    /// Register the record returned by `list_children` for its `id`
    pub fn add_node(&self, record: Value) {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default();
        self.state.write().unwrap().nodes.insert(id, record);
    }

    /// Register the graph returned for `node_id`
    pub fn add_graph(&self, node_id: impl Into<String>, graph: RelationshipGraph) {
        self.state
            .write()
            .unwrap()
            .graphs
            .insert(node_id.into(), graph);
    }

    /// Make every call touching `node_id` fail
    pub fn fail_on(&self, node_id: impl Into<String>, failure: MockFailure) {
        self.state
            .write()
            .unwrap()
            .failures
            .insert(node_id.into(), failure);
    }

    /// Make the root listing fail
    pub fn fail_root(&self, failure: MockFailure) {
        self.state.write().unwrap().root_failure = Some(failure);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Number of recorded calls matching `call`
    pub fn call_count(&self, call: &MockCall) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    fn record(&self, call: MockCall) {
        self.state.write().unwrap().calls.push(call);
    }

    fn failure_for(&self, node_id: &str) -> Option<LineageError> {
        self.state
            .read()
            .unwrap()
            .failures
            .get(node_id)
            .map(|f| f.to_error(node_id))
    }
}

impl CatalogApi for MockCatalog {
    fn list_root_catalog(&self) -> Result<Vec<CatalogNode>> {
        self.record(MockCall::Root);
        let state = self.state.read().unwrap();
        if let Some(failure) = state.root_failure {
            return Err(failure.to_error("<root>"));
        }
        state
            .root
            .iter()
            .cloned()
            .map(CatalogNode::from_value)
            .collect()
    }

    fn list_children(&self, node_id: &str) -> Result<CatalogNode> {
        self.record(MockCall::Children(node_id.to_string()));
        if let Some(err) = self.failure_for(node_id) {
            return Err(err);
        }
        let record = self
            .state
            .read()
            .unwrap()
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| LineageError::NotFound(node_id.to_string()))?;
        CatalogNode::from_value(record)
    }

    fn get_relationship_graph(&self, node_id: &str) -> Result<RelationshipGraph> {
        self.record(MockCall::Graph(node_id.to_string()));
        if let Some(err) = self.failure_for(node_id) {
            return Err(err);
        }
        self.state
            .read()
            .unwrap()
            .graphs
            .get(node_id)
            .cloned()
            .ok_or_else(|| LineageError::NotFound(node_id.to_string()))
    }
}

//! Wire types for the catalog REST API
//!
//! Catalog nodes keep the full JSON object the server sent next to the few
//! typed fields the traversal needs. The raw object is what ends up in the
//! lineage document, so unknown fields survive untouched.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{LineageError, Result};

/// Kind of container a catalog entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerType {
    Home,
    Space,
    Folder,
    Source,
    Function,
    /// Anything the service adds later
    #[serde(other)]
    Other,
}

impl ContainerType {
    /// Only home and space entries are walked from the root listing
    pub fn is_root_walkable(&self) -> bool {
        matches!(self, ContainerType::Home | ContainerType::Space)
    }
}

/// Node discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Container,
    Dataset,
    File,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeFields {
    id: String,
    #[serde(default)]
    path: Vec<String>,
    #[serde(default)]
    container_type: Option<ContainerType>,
    #[serde(rename = "type", default)]
    node_type: Option<NodeType>,
}

/// A node in the catalog namespace tree
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogNode {
    pub id: String,
    pub path: Vec<String>,
    pub container_type: Option<ContainerType>,
    pub node_type: NodeType,
    /// Present when the node was fetched as an expandable container
    pub children: Option<Vec<CatalogNode>>,
    raw: Value,
}

impl CatalogNode {
    /// Build a node from the JSON object the service returned
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields = NodeFields::deserialize(&raw)
            .map_err(|e| LineageError::Decode(format!("Malformed catalog node: {}", e)))?;

        let children = match raw.get("children") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .cloned()
                    .map(CatalogNode::from_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(other) => {
                return Err(LineageError::Decode(format!(
                    "Catalog node {} has non-array children: {}",
                    fields.id, other
                )))
            }
        };

        Ok(Self {
            id: fields.id,
            path: fields.path,
            container_type: fields.container_type,
            node_type: fields.node_type.unwrap_or_default(),
            children,
            raw,
        })
    }

    pub fn is_dataset(&self) -> bool {
        self.node_type == NodeType::Dataset
    }

    /// The payload exactly as discovered
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<'de> Deserialize<'de> for CatalogNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        CatalogNode::from_value(raw).map_err(D::Error::custom)
    }
}

impl Serialize for CatalogNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

/// Body of the root catalog listing
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogListing {
    pub data: Vec<CatalogNode>,
}

/// One end of a lineage edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRef {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Deserialize)]
struct GraphFields {
    #[serde(default)]
    parents: Option<Vec<GraphRef>>,
    #[serde(default)]
    children: Option<Vec<GraphRef>>,
}

/// Upstream/downstream relationships of a dataset
///
/// Like [`CatalogNode`], the graph serializes back to the exact object the
/// service returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipGraph {
    pub parents: Vec<GraphRef>,
    pub children: Vec<GraphRef>,
    raw: Value,
}

impl RelationshipGraph {
    /// Build a graph from the JSON object the service returned
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields = GraphFields::deserialize(&raw)
            .map_err(|e| LineageError::Decode(format!("Malformed relationship graph: {}", e)))?;

        Ok(Self {
            parents: fields.parents.unwrap_or_default(),
            children: fields.children.unwrap_or_default(),
            raw,
        })
    }

    /// A graph whose only edges are the given upstream ids
    pub fn with_parents<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parents: Vec<GraphRef> = ids.into_iter().map(GraphRef::new).collect();
        let refs: Vec<Value> = parents.iter().map(|p| json!({ "id": p.id })).collect();
        Self {
            raw: json!({ "parents": refs, "children": [] }),
            parents,
            children: Vec::new(),
        }
    }

    /// The payload exactly as returned
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::with_parents(Vec::<String>::new())
    }
}

impl<'de> Deserialize<'de> for RelationshipGraph {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        RelationshipGraph::from_value(raw).map_err(D::Error::custom)
    }
}

impl Serialize for RelationshipGraph {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_entry_decodes() {
        let node: CatalogNode = serde_json::from_value(json!({
            "id": "s1",
            "path": ["Marketing"],
            "tag": "abc",
            "type": "CONTAINER",
            "containerType": "SPACE",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(node.id, "s1");
        assert_eq!(node.container_type, Some(ContainerType::Space));
        assert_eq!(node.node_type, NodeType::Container);
        assert!(node.children.is_none());
        assert_eq!(node.raw()["createdAt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_unknown_discriminators_are_tolerated() {
        let node: CatalogNode = serde_json::from_value(json!({
            "id": "x",
            "path": ["x"],
            "type": "PHYSICAL_DATASET",
            "containerType": "ARCTIC_CATALOG"
        }))
        .unwrap();

        assert_eq!(node.container_type, Some(ContainerType::Other));
        assert_eq!(node.node_type, NodeType::Other);
        assert!(!node.is_dataset());
        assert!(!node.container_type.unwrap().is_root_walkable());
    }

    #[test]
    fn test_children_are_decoded_recursively() {
        let node = CatalogNode::from_value(json!({
            "id": "s1",
            "path": ["s1"],
            "children": [
                {"id": "d1", "path": ["s1", "d1"], "type": "DATASET", "datasetType": "VIRTUAL"},
                {"id": "f1", "path": ["s1", "f1"], "type": "CONTAINER", "containerType": "FOLDER"}
            ]
        }))
        .unwrap();

        let children = node.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0].is_dataset());
        assert_eq!(children[0].raw()["datasetType"], "VIRTUAL");
        assert_eq!(children[1].container_type, Some(ContainerType::Folder));
    }

    #[test]
    fn test_missing_id_is_decode_error() {
        let err = CatalogNode::from_value(json!({"path": ["a"]})).unwrap_err();
        assert!(matches!(err, LineageError::Decode(_)));
    }

    #[test]
    fn test_node_serializes_as_raw_payload() {
        let raw = json!({"id": "d1", "path": ["a", "d1"], "type": "DATASET", "owner": {"id": "u"}});
        let node = CatalogNode::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn test_graph_keeps_extra_fields() {
        let graph: RelationshipGraph = serde_json::from_value(json!({
            "parents": [{"id": "p1", "path": ["src", "t"], "type": "PHYSICAL_DATASET"}],
            "children": []
        }))
        .unwrap();

        assert_eq!(graph.parents[0].id, "p1");
        assert_eq!(graph.parents[0].extra["type"], "PHYSICAL_DATASET");

        let empty: RelationshipGraph = serde_json::from_value(json!({})).unwrap();
        assert!(empty.parents.is_empty());
    }

    #[test]
    fn test_graph_serializes_verbatim() {
        let raw = json!({"children": [{"id": "c1"}], "parents": [{"id": "p1", "tag": "x"}]});
        let graph = RelationshipGraph::from_value(raw.clone()).unwrap();
        assert_eq!(graph.children[0].id, "c1");
        assert_eq!(serde_json::to_string(&graph).unwrap(), raw.to_string());

        // Absent keys are not filled in on output
        let sparse = json!({"parents": null});
        let graph: RelationshipGraph = serde_json::from_value(sparse.clone()).unwrap();
        assert!(graph.parents.is_empty());
        assert!(graph.children.is_empty());
        assert_eq!(serde_json::to_value(&graph).unwrap(), sparse);
    }

    #[test]
    fn test_graph_with_non_array_parents_is_decode_error() {
        let err = RelationshipGraph::from_value(json!({"parents": "p1"})).unwrap_err();
        assert!(matches!(err, LineageError::Decode(_)));
    }

    #[test]
    fn test_null_type_is_not_a_dataset() {
        let node = CatalogNode::from_value(json!({
            "id": "s1",
            "path": ["s1"],
            "children": [
                {"id": "odd", "path": ["s1", "odd"], "type": null},
                {"id": "d1", "path": ["s1", "d1"], "type": "DATASET"}
            ]
        }))
        .unwrap();

        let children = node.children.unwrap();
        assert_eq!(children[0].node_type, NodeType::Other);
        assert!(!children[0].is_dataset());
        assert_eq!(children[0].raw()["type"], Value::Null);
        assert!(children[1].is_dataset());
    }
}

//! Lineage records, one per discovered dataset

use serde::Serialize;

use crate::catalog::{CatalogNode, RelationshipGraph};
use crate::error::{LineageError, Result};

/// How a dataset was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Dataset listed directly in the root catalog
    Root,
    /// Dataset found among a container's children
    Child,
    /// Dataset fetched as an upstream dependency
    Upstream,
}

/// The node payload as discovered, kept verbatim for downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawData {
    /// Root-level datasets only carry their id
    Id(String),
    /// Child entry from a container listing
    Child(CatalogNode),
    /// Full record fetched for an upstream dependency
    Parent(CatalogNode),
}

impl RawData {
    pub fn origin(&self) -> Origin {
        match self {
            RawData::Id(_) => Origin::Root,
            RawData::Child(_) => Origin::Child,
            RawData::Parent(_) => Origin::Upstream,
        }
    }
}

/// One entry of the lineage document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageRecord {
    pub id: String,
    /// Last path segment
    pub name: String,
    /// Dot-joined quoted path, e.g. `"space"."folder"."table"`
    #[serde(rename = "path")]
    pub qualified_path: String,
    #[serde(rename = "data")]
    pub raw_data: RawData,
    /// Relationship graph of the dataset
    #[serde(rename = "lineage")]
    pub upstream: RelationshipGraph,
}

impl LineageRecord {
    /// Build a record; the path must have at least one segment
    pub fn new(
        id: impl Into<String>,
        path: &[String],
        raw_data: RawData,
        upstream: RelationshipGraph,
    ) -> Result<Self> {
        let id = id.into();
        let name = path
            .last()
            .cloned()
            .ok_or_else(|| LineageError::Decode(format!("Dataset {} has an empty path", id)))?;

        Ok(Self {
            qualified_path: qualified_path(path),
            id,
            name,
            raw_data,
            upstream,
        })
    }

    pub fn origin(&self) -> Origin {
        self.raw_data.origin()
    }

    /// Ids of the direct upstream dependencies
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.upstream.parents.iter().map(|p| p.id.as_str())
    }
}

/// Render path segments as a quoted, dot-joined identifier.
///
/// Segments are wrapped as-is; embedded quotes are not escaped.
pub fn qualified_path(path: &[String]) -> String {
    path.iter()
        .map(|segment| format!("\"{}\"", segment))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_qualified_path() {
        assert_eq!(qualified_path(&path(&["a", "b", "c"])), r#""a"."b"."c""#);
        assert_eq!(qualified_path(&path(&["single"])), r#""single""#);
        assert_eq!(
            qualified_path(&path(&["@user", "my table"])),
            r#""@user"."my table""#
        );
    }

    #[test]
    fn test_record_name_is_last_segment() {
        let record = LineageRecord::new(
            "d1",
            &path(&["space", "folder", "table"]),
            RawData::Id("d1".to_string()),
            RelationshipGraph::default(),
        )
        .unwrap();

        assert_eq!(record.name, "table");
        assert_eq!(record.qualified_path, r#""space"."folder"."table""#);
        assert_eq!(record.origin(), Origin::Root);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let err = LineageRecord::new(
            "d1",
            &[],
            RawData::Id("d1".to_string()),
            RelationshipGraph::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LineageError::Decode(_)));
    }

    #[test]
    fn test_record_serializes_with_document_field_names() {
        let child = CatalogNode::from_value(json!({
            "id": "d1", "path": ["s1", "d1"], "type": "DATASET"
        }))
        .unwrap();
        let record = LineageRecord::new(
            "d1",
            &path(&["s1", "d1"]),
            RawData::Child(child),
            RelationshipGraph::with_parents(["p1"]),
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "d1",
                "name": "d1",
                "path": "\"s1\".\"d1\"",
                "data": {"id": "d1", "path": ["s1", "d1"], "type": "DATASET"},
                "lineage": {"parents": [{"id": "p1"}], "children": []}
            })
        );
    }

    #[test]
    fn test_root_record_data_is_bare_id() {
        let record = LineageRecord::new(
            "abc",
            &path(&["abc"]),
            RawData::Id("abc".to_string()),
            RelationshipGraph::default(),
        )
        .unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap()["data"], json!("abc"));
    }
}

/*!
 * Catalog service access
 *
 * The traversal engine only talks to the catalog through [`CatalogApi`], so
 * it can run against the HTTP client or the in-memory mock alike.
 */

pub mod client;
pub mod endpoint;
pub mod mock;
pub mod types;

pub use client::{build_http_client, CatalogClient};
pub use endpoint::CatalogEndpoint;
pub use mock::{MockCall, MockCatalog, MockFailure};
pub use types::{CatalogListing, CatalogNode, ContainerType, GraphRef, NodeType, RelationshipGraph};

use crate::error::Result;

/// The three read operations the traversal needs
pub trait CatalogApi {
    /// Top-level catalog entries
    fn list_root_catalog(&self) -> Result<Vec<CatalogNode>>;

    /// Full record of a node, with `children` when it is expandable
    fn list_children(&self, node_id: &str) -> Result<CatalogNode>;

    /// Upstream and downstream relationships of a node
    fn get_relationship_graph(&self, node_id: &str) -> Result<RelationshipGraph>;
}

impl<T: CatalogApi + ?Sized> CatalogApi for &T {
    fn list_root_catalog(&self) -> Result<Vec<CatalogNode>> {
        (**self).list_root_catalog()
    }

    fn list_children(&self, node_id: &str) -> Result<CatalogNode> {
        (**self).list_children(node_id)
    }

    fn get_relationship_graph(&self, node_id: &str) -> Result<RelationshipGraph> {
        (**self).get_relationship_graph(node_id)
    }
}

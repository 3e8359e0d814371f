/*!
 * lineage-sync - dataset lineage extraction for REST data catalogs
 *
 * Walks the catalog tree of a Dremio-style catalog service, resolves the
 * upstream relationships of every dataset it finds, and writes the result as
 * a single JSON document:
 * - Worklist traversal over home and space containers at any depth
 * - Transitive upstream closure with parent de-duplication
 * - Self-hosted (user/password login) and cloud (project-scoped, token) modes
 * - Configurable retry with exponential backoff and jitter
 * - Abort or skip-and-report handling of per-node failures
 *
 * Version: 0.1.0
 * Author: Shane Wall <shaneawall@gmail.com>
 */

pub mod auth;
pub mod catalog;
pub mod cli_style;
pub mod config;
pub mod error;
pub mod lineage;
pub mod logging;
pub mod output;
pub mod retry;
pub mod runner;
pub mod stats;

// Re-export commonly used types
pub use catalog::{CatalogApi, CatalogClient, CatalogNode, MockCatalog, RelationshipGraph};
pub use config::{DeploymentMode, ErrorMode, LogLevel, RunConfig};
pub use error::{LineageError, Result};
pub use lineage::{LineageRecord, LineageRun, TraversalEngine};
pub use runner::{run_and_write, run_lineage};
pub use stats::TraversalStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Catalog URL construction
//!
//! The deployment mode only changes where the catalog lives. The base path
//! is resolved once; every request URL is derived from it.

use url::Url;

use crate::config::{DeploymentMode, RunConfig};
use crate::error::{LineageError, Result};

/// Resolved catalog location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoint {
    base: Url,
}

impl CatalogEndpoint {
    /// Resolve the catalog base from the service URL and deployment mode
    pub fn resolve(config: &RunConfig) -> Result<Self> {
        let service = config.url.trim().trim_end_matches('/');
        let base = match config.deployment {
            DeploymentMode::SelfHosted => format!("{}/api/v3/catalog", service),
            DeploymentMode::Cloud => format!(
                "{}{}/projects/{}/catalog",
                service,
                normalize_prefix(&config.api_prefix),
                config.project_id.trim()
            ),
        };

        let base = Url::parse(&base)
            .map_err(|e| LineageError::Config(format!("Invalid catalog URL {}: {}", base, e)))?;
        if base.cannot_be_a_base() {
            return Err(LineageError::Config(format!(
                "Catalog URL {} cannot carry a path",
                base
            )));
        }

        Ok(Self { base })
    }

    /// Root catalog listing
    pub fn root(&self) -> Url {
        self.base.clone()
    }

    /// A single node by id
    pub fn node(&self, node_id: &str) -> Url {
        self.with_segments(&[node_id])
    }

    /// Relationship graph of a node
    pub fn graph(&self, node_id: &str) -> Url {
        self.with_segments(&[node_id, "graph"])
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in resolve()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Login endpoint for self-hosted deployments
pub fn login_url(config: &RunConfig) -> Result<Url> {
    let raw = format!("{}/apiv2/login", config.url.trim().trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| LineageError::Config(format!("Invalid login URL {}: {}", raw, e)))
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

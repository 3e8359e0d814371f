//! HTTP implementation of [`CatalogApi`]

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::endpoint::CatalogEndpoint;
use super::types::{CatalogListing, CatalogNode, RelationshipGraph};
use super::CatalogApi;
use crate::auth::Credential;
use crate::config::RunConfig;
use crate::error::{LineageError, Result};
use crate::retry::{with_retry, RetryPolicy};

const USER_AGENT: &str = concat!("lineage-sync/", env!("CARGO_PKG_VERSION"));

/// Build the blocking HTTP client shared by login and catalog requests
pub fn build_http_client(config: &RunConfig) -> Result<Client> {
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate validation is disabled");
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| LineageError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Read-only catalog client bound to one credential and one service
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    endpoint: CatalogEndpoint,
    credential: Credential,
    retry: RetryPolicy,
}

impl CatalogClient {
    pub fn new(
        http: Client,
        endpoint: CatalogEndpoint,
        credential: Credential,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            endpoint,
            credential,
            retry,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str, node_id: &str) -> Result<T> {
        with_retry(&self.retry, what, || {
            tracing::debug!(url = %url, "GET {}", what);

            let response = self
                .http
                .get(url.clone())
                .header(AUTHORIZATION, self.credential.header_value())
                .header(CONTENT_TYPE, "application/json")
                .send()?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(LineageError::NotFound(node_id.to_string()));
            }
            if !status.is_success() {
                return Err(LineageError::from_status(what, status.as_u16()));
            }

            let body = response.text()?;
            tracing::trace!(bytes = body.len(), body = %body, "{} response", what);
            serde_json::from_str(&body).map_err(|e| {
                LineageError::Decode(format!("{} for {}: {}", what, display_id(node_id), e))
            })
        })
    }
}

fn display_id(node_id: &str) -> &str {
    if node_id.is_empty() {
        "<root>"
    } else {
        node_id
    }
}

impl CatalogApi for CatalogClient {
    fn list_root_catalog(&self) -> Result<Vec<CatalogNode>> {
        tracing::info!("Fetching catalogs");
        let listing: CatalogListing = self.get_json(self.endpoint.root(), "catalog listing", "")?;
        Ok(listing.data)
    }

    fn list_children(&self, node_id: &str) -> Result<CatalogNode> {
        tracing::info!(id = node_id, "Fetching catalog children");
        self.get_json(self.endpoint.node(node_id), "catalog entry", node_id)
    }

    fn get_relationship_graph(&self, node_id: &str) -> Result<RelationshipGraph> {
        tracing::info!(id = node_id, "Fetching catalog graph");
        self.get_json(self.endpoint.graph(node_id), "catalog graph", node_id)
    }
}

/*!
 * End-to-end lineage run: authenticate, traverse, write the document
 */

use crate::auth::acquire_credential;
use crate::catalog::{build_http_client, CatalogApi, CatalogClient, CatalogEndpoint};
use crate::cli_style;
use crate::config::RunConfig;
use crate::error::Result;
use crate::lineage::{LineageRun, TraversalEngine};
use crate::output::{write_document, DocumentFormat};
use crate::retry::{with_retry, RetryPolicy};

/// Authenticate against the configured service and traverse it.
///
/// Nothing is written here; see [`run_and_write`].
pub fn run_lineage(config: &RunConfig) -> Result<LineageRun> {
    config.validate()?;

    let http = build_http_client(config)?;
    let endpoint = CatalogEndpoint::resolve(config)?;
    let retry = RetryPolicy::from(config.retry.clone());

    let credential = with_retry(&retry, "login", || acquire_credential(config, &http))?;
    let client = CatalogClient::new(http, endpoint, credential, retry);

    traverse(client, config)
}

/// Traverse any catalog implementation with the engine options from `config`
pub fn traverse<C: CatalogApi>(catalog: C, config: &RunConfig) -> Result<LineageRun> {
    let spinner = cli_style::traversal_spinner(config.show_progress);
    TraversalEngine::new(catalog, config)
        .with_progress(spinner)
        .run()
}

/// Run and, only when the traversal finished, write the lineage document
pub fn run_and_write(config: &RunConfig) -> Result<LineageRun> {
    let run = run_lineage(config)?;
    write_document(
        &run.records,
        &config.output,
        DocumentFormat::from_pretty(config.pretty),
    )?;
    Ok(run)
}

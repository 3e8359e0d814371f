/*!
 * Lineage traversal engine
 *
 * Turns the root catalog listing into the full set of lineage records in two
 * phases:
 *
 * 1. **Discovery**: a worklist seeded with the root listing. Root entries are
 *    only walked when their container type is HOME or SPACE. Datasets are
 *    recorded together with their relationship graph; every other child is
 *    appended to the same worklist and expanded later, without the root
 *    filter. Processing follows insertion order.
 * 2. **Upstream closure**: walks the record list while it grows. Each parent
 *    reference not yet seen is fetched once and appended as a new record,
 *    whose own parents are visited in turn.
 *
 * Two quirks are kept on purpose:
 *
 * - A parent is skipped when its id is a *substring* of the dependent
 *   record's id, not only when it is equal.
 * - The seen-parent set starts empty, so a parent that was already recorded
 *   during discovery is fetched and recorded again. Set
 *   `reconcile_primary_ids` to seed the set with the discovery ids instead.
 */

pub mod record;

pub use record::{qualified_path, LineageRecord, Origin, RawData};

use indicatif::ProgressBar;
use std::collections::{HashSet, VecDeque};

use crate::catalog::{CatalogApi, CatalogNode};
use crate::config::{ErrorMode, RunConfig};
use crate::error::{LineageError, Result};
use crate::stats::{Phase, SkippedNode, TraversalStats};

/// Worklist entry for the discovery phase
#[derive(Debug, Clone, PartialEq)]
pub enum WorkItem {
    /// Entry from the root listing, subject to the HOME/SPACE filter
    Root(CatalogNode),
    /// Container found among children, always expanded
    Nested(CatalogNode),
}

/// Engine knobs taken from the run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalOptions {
    pub error_mode: ErrorMode,
    pub reconcile_primary_ids: bool,
}

impl From<&RunConfig> for TraversalOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            error_mode: config.error_mode,
            reconcile_primary_ids: config.reconcile_primary_ids,
        }
    }
}

/// Result of a finished traversal
#[derive(Debug, Clone)]
pub struct LineageRun {
    pub records: Vec<LineageRecord>,
    pub stats: TraversalStats,
}

impl LineageRun {
    pub fn is_complete(&self) -> bool {
        self.stats.is_complete()
    }
}

/// Owns the worklist, the seen-parent set, and the growing record list
pub struct TraversalEngine<C: CatalogApi> {
    catalog: C,
    options: TraversalOptions,
    worklist: VecDeque<WorkItem>,
    records: Vec<LineageRecord>,
    seen_parents: HashSet<String>,
    stats: TraversalStats,
    progress: ProgressBar,
}

impl<C: CatalogApi> TraversalEngine<C> {
    pub fn new(catalog: C, config: &RunConfig) -> Self {
        Self::with_options(catalog, TraversalOptions::from(config))
    }

    pub fn with_options(catalog: C, options: TraversalOptions) -> Self {
        Self {
            catalog,
            options,
            worklist: VecDeque::new(),
            records: Vec::new(),
            seen_parents: HashSet::new(),
            stats: TraversalStats::new(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` (a spinner, usually)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run both phases. A failed root listing is always fatal.
    pub fn run(mut self) -> Result<LineageRun> {
        let roots = self.catalog.list_root_catalog()?;
        self.stats.api_calls += 1;
        self.stats.root_entries = roots.len();
        tracing::info!(entries = roots.len(), "Root catalog listed");

        self.worklist.extend(roots.into_iter().map(WorkItem::Root));
        self.discover()?;
        tracing::info!(
            datasets = self.records.len(),
            containers = self.stats.containers_expanded,
            "Discovery finished"
        );

        self.close_upstream()?;
        tracing::info!(
            records = self.records.len(),
            upstream = self.stats.upstream_datasets,
            skipped = self.stats.skipped.len(),
            "Upstream closure finished"
        );

        self.stats.finish();
        self.progress.finish_and_clear();

        Ok(LineageRun {
            records: self.records,
            stats: self.stats,
        })
    }

    fn discover(&mut self) -> Result<()> {
        while let Some(item) = self.worklist.pop_front() {
            match item {
                WorkItem::Root(node) => {
                    let walkable = node
                        .container_type
                        .map(|ct| ct.is_root_walkable())
                        .unwrap_or(false);
                    if !walkable {
                        tracing::debug!(
                            id = %node.id,
                            container_type = ?node.container_type,
                            "Ignoring root entry"
                        );
                        self.stats.roots_ignored += 1;
                        continue;
                    }

                    if node.is_dataset() {
                        self.record_root_dataset(node)?;
                    } else {
                        self.expand(node)?;
                    }
                }
                WorkItem::Nested(node) => self.expand(node)?,
            }
        }
        Ok(())
    }

    fn expand(&mut self, container: CatalogNode) -> Result<()> {
        let fetched = self.catalog.list_children(&container.id);
        self.stats.api_calls += 1;
        let Some(expanded) = self.tolerate(Phase::Discovery, &container.id, fetched)? else {
            return Ok(());
        };
        self.stats.containers_expanded += 1;

        let Some(children) = expanded.children else {
            tracing::debug!(id = %container.id, "Container has no children");
            return Ok(());
        };

        for child in children {
            if child.is_dataset() {
                self.record_child_dataset(child)?;
            } else {
                self.worklist.push_back(WorkItem::Nested(child));
            }
        }
        Ok(())
    }

    fn record_root_dataset(&mut self, node: CatalogNode) -> Result<()> {
        let raw = RawData::Id(node.id.clone());
        self.record_primary(&node.id, &node.path, raw)
    }

    fn record_child_dataset(&mut self, child: CatalogNode) -> Result<()> {
        let id = child.id.clone();
        let path = child.path.clone();
        self.record_primary(&id, &path, RawData::Child(child))
    }

    fn record_primary(&mut self, id: &str, path: &[String], raw: RawData) -> Result<()> {
        let graph = self.catalog.get_relationship_graph(id);
        self.stats.api_calls += 1;
        let Some(graph) = self.tolerate(Phase::Discovery, id, graph)? else {
            return Ok(());
        };

        let record = LineageRecord::new(id, path, raw, graph);
        if let Some(record) = self.tolerate(Phase::Discovery, id, record)? {
            self.stats.primary_datasets += 1;
            self.push(record);
        }
        Ok(())
    }

    fn close_upstream(&mut self) -> Result<()> {
        if self.options.reconcile_primary_ids {
            self.seen_parents
                .extend(self.records.iter().map(|r| r.id.clone()));
        }

        // Records appended below are visited by this same loop
        let mut index = 0;
        while index < self.records.len() {
            let record_id = self.records[index].id.clone();
            let parent_ids: Vec<String> = self.records[index]
                .parent_ids()
                .map(str::to_string)
                .collect();

            for parent_id in parent_ids {
                if record_id.contains(parent_id.as_str()) {
                    tracing::debug!(record = %record_id, parent = %parent_id, "Skipping self reference");
                    self.stats.self_references_skipped += 1;
                    continue;
                }
                if !self.seen_parents.insert(parent_id.clone()) {
                    self.stats.parents_already_seen += 1;
                    continue;
                }
                self.record_parent(&parent_id)?;
            }
            index += 1;
        }
        Ok(())
    }

    fn record_parent(&mut self, parent_id: &str) -> Result<()> {
        let fetched = self.catalog.list_children(parent_id);
        self.stats.api_calls += 1;
        let Some(node) = self.tolerate(Phase::Upstream, parent_id, fetched)? else {
            return Ok(());
        };

        let graph = self.catalog.get_relationship_graph(&node.id);
        self.stats.api_calls += 1;
        let Some(graph) = self.tolerate(Phase::Upstream, &node.id, graph)? else {
            return Ok(());
        };

        let id = node.id.clone();
        let path = node.path.clone();
        let record = LineageRecord::new(id.as_str(), &path, RawData::Parent(node), graph);
        if let Some(record) = self.tolerate(Phase::Upstream, &id, record)? {
            self.stats.upstream_datasets += 1;
            self.push(record);
        }
        Ok(())
    }

    fn push(&mut self, record: LineageRecord) {
        tracing::debug!(id = %record.id, path = %record.qualified_path, "Recorded dataset");
        self.records.push(record);
        self.progress.set_message(format!(
            "{} datasets, {} containers",
            self.records.len(),
            self.stats.containers_expanded
        ));
        self.progress.tick();
    }

    /// In skip mode a failed fetch is logged and recorded instead of ending the run
    fn tolerate<T>(&mut self, phase: Phase, node_id: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.options.error_mode == ErrorMode::Skip => {
                tracing::warn!(id = node_id, %phase, error = %e, "Skipping node");
                self.stats.skipped.push(SkippedNode::new(node_id, phase, &e));
                Ok(None)
            }
            Err(e) => Err(with_node_context(e, node_id)),
        }
    }
}

fn with_node_context(err: LineageError, node_id: &str) -> LineageError {
    match err {
        LineageError::Decode(msg) if !msg.contains(node_id) => {
            LineageError::Decode(format!("{} (node {})", msg, node_id))
        }
        other => other,
    }
}

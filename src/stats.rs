/*!
 * Traversal statistics
 */

use chrono::{DateTime, Utc};
use std::fmt;

use crate::cli_style::{self, Theme};
use crate::error::{ErrorCategory, LineageError};

/// Traversal phase a node was visited in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Worklist walk over home/space containers
    Discovery,
    /// Transitive parent expansion
    Upstream,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Discovery => write!(f, "discovery"),
            Phase::Upstream => write!(f, "upstream"),
        }
    }
}

/// A node whose fetch failed and was left out of the document
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    pub node_id: String,
    pub phase: Phase,
    pub category: ErrorCategory,
    pub error: String,
}

impl SkippedNode {
    pub fn new(node_id: impl Into<String>, phase: Phase, error: &LineageError) -> Self {
        Self {
            node_id: node_id.into(),
            phase,
            category: error.category(),
            error: error.to_string(),
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone)]
pub struct TraversalStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub root_entries: usize,
    /// Root entries without a container type, or not home/space
    pub roots_ignored: usize,
    pub containers_expanded: usize,
    pub primary_datasets: usize,
    pub upstream_datasets: usize,
    /// Parents whose id is contained in the dependent dataset's id
    pub self_references_skipped: usize,
    pub parents_already_seen: usize,
    pub api_calls: usize,
    pub skipped: Vec<SkippedNode>,
}

impl Default for TraversalStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TraversalStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            root_entries: 0,
            roots_ignored: 0,
            containers_expanded: 0,
            primary_datasets: 0,
            upstream_datasets: 0,
            self_references_skipped: 0,
            parents_already_seen: 0,
            api_calls: 0,
            skipped: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_records(&self) -> usize {
        self.primary_datasets + self.upstream_datasets
    }

    /// True when no node was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn elapsed_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Print formatted statistics
    pub fn print(&self) {
        cli_style::section_header("Lineage Summary");

        let rows = [
            ("Root entries", self.root_entries.to_string()),
            ("Ignored root entries", self.roots_ignored.to_string()),
            ("Containers expanded", self.containers_expanded.to_string()),
            ("Primary datasets", self.primary_datasets.to_string()),
            ("Upstream datasets", self.upstream_datasets.to_string()),
            ("Records written", self.total_records().to_string()),
            ("Self references skipped", self.self_references_skipped.to_string()),
            ("Repeat parents skipped", self.parents_already_seen.to_string()),
            ("API calls", self.api_calls.to_string()),
            ("Duration", cli_style::format_duration(self.elapsed_secs())),
        ];
        println!("{}", cli_style::stats_table(&rows));

        if !self.skipped.is_empty() {
            println!(
                "\n{}",
                Theme::warning(format!("{} node(s) skipped:", self.skipped.len()))
            );
            println!("{}", cli_style::skipped_table(&self.skipped));
        }
    }
}

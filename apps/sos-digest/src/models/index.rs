//! Index schema: lists the categories to collect and the issue checks to run.

use super::policy::{LineFilter, Predicate, Severity};
use serde::{Deserialize, Serialize};

/// Line budget applied when a category does not declare `max_lines`.
pub const DEFAULT_MAX_LINES: usize = 1500;

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
/// Top-level rule index.
pub struct Index {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryDefinition>,
    #[serde(default, rename = "issue")]
    pub issues: Vec<IssueCheckDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// A topic bucket rendered into `<key>.md`.
pub struct CategoryDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Per-file line budget; each resolved file may keep up to this many lines.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// A known problem signature scanned for in a single source file.
pub struct IssueCheckDefinition {
    pub name: String,
    pub source: String,
    pub check: Predicate,
    #[serde(default)]
    pub filter: Option<LineFilter>,
    /// Human-readable description of what `filter` looks for.
    #[serde(default)]
    pub filter_terms: Option<String>,
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
}

//! Shared data models for collection/scan outputs and index/policy modules.

pub mod index;
pub mod policy;

use policy::Severity;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
/// Outcome of reading one resolved file.
pub enum FileStatus {
    Included,
    Empty,
    Unreadable(String),
}

#[derive(Debug, Clone, Serialize)]
/// One resolved file's contribution to a category.
pub struct FileEntry {
    /// Path relative to the sosreport root, `/`-separated.
    pub path: String,
    pub size: u64,
    pub status: FileStatus,
    #[serde(skip)]
    pub lines: Vec<String>,
    pub original_lines: usize,
    pub truncated: bool,
}

impl FileEntry {
    pub fn is_included(&self) -> bool {
        self.status == FileStatus::Included
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregate counters for a collected category. Informational only.
pub struct CollectStats {
    pub files_found: usize,
    pub files_missing: usize,
    pub files_unreadable: usize,
    pub files_truncated: usize,
    pub lines_emitted: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Per-category collection result, in resolution order.
pub struct CollectedContent {
    pub key: String,
    pub title: String,
    pub description: String,
    pub max_lines: usize,
    pub entries: Vec<FileEntry>,
    /// Listed paths that do not exist under the root.
    pub missing: Vec<String>,
    pub stats: CollectStats,
}

impl CollectedContent {
    pub fn included(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| e.is_included())
    }
}

#[derive(Debug, Clone, Serialize)]
/// A check whose predicate matched its source.
pub struct IssueFinding {
    pub name: String,
    pub source: String,
    pub severity: Severity,
    pub description: String,
    pub filter_terms: Option<String>,
    pub excerpt: Vec<String>,
    /// Predicate matched but the filter selected nothing.
    pub no_lines_extracted: bool,
    /// The excerpt was cut to the scan line budget.
    pub excerpt_truncated: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Scan results in check order, plus bookkeeping for the summary.
pub struct ScanReport {
    pub findings: Vec<IssueFinding>,
    pub evaluated: usize,
    /// Checks skipped because their source does not exist.
    pub skipped_missing: usize,
    /// `(source, reason)` for sources that exist but could not be read.
    pub unreadable: Vec<(String, String)>,
}

impl ScanReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

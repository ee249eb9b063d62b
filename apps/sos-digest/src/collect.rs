//! Category collection: resolve, read, and truncate each file on its own.
//!
//! The category's `max_lines` is a per-file budget. A large log in a category
//! never shrinks the share of the small files next to it, and vice versa.

use crate::models::index::CategoryDefinition;
use crate::models::{CollectStats, CollectedContent, FileEntry, FileStatus};
use crate::resolve::resolve;
use crate::truncate::truncate_tail;
use crate::utils::rel_to_root;
use std::fs;
use std::path::Path;

/// Bytes inspected when deciding whether a file is binary.
const SNIFF_BYTES: usize = 8 * 1024;

/// Share of control bytes (NUL excluded) above which a sample is binary.
const BINARY_CONTROL_RATIO: f64 = 0.10;

/// NUL runs are padding left by unclean shutdowns; any other control byte
/// besides common whitespace and ESC points to binary data.
fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_BYTES)];
    let mut text = 0usize;
    let mut control = 0usize;
    for &b in sample {
        match b {
            0 => {}
            b'\t' | b'\n' | b'\r' | 0x0c | 0x1b => text += 1,
            0x01..=0x1f | 0x7f => control += 1,
            _ => text += 1,
        }
    }
    let seen = text + control;
    seen > 0 && control as f64 / seen as f64 > BINARY_CONTROL_RATIO
}

/// Read a file as text.
///
/// NUL bytes are dropped and invalid UTF-8 is replaced lossily, so padded or
/// damaged logs still come through. Only content dominated by other control
/// bytes is rejected as binary.
pub(crate) fn read_text(path: &Path) -> Result<String, String> {
    let mut bytes = fs::read(path).map_err(|e| e.to_string())?;
    if looks_binary(&bytes) {
        return Err("binary content".to_string());
    }
    bytes.retain(|&b| b != 0);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collect one category from the sosreport at `root`.
pub fn collect(category: &CategoryDefinition, root: &Path) -> CollectedContent {
    let resolution = resolve(root, &category.files, &category.globs);
    let mut stats = CollectStats {
        files_missing: resolution.missing.len(),
        ..CollectStats::default()
    };

    let mut entries = Vec::with_capacity(resolution.found.len());
    for path in &resolution.found {
        let rel = rel_to_root(path, root);
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let text = match read_text(path) {
            Ok(t) => t,
            Err(reason) => {
                tracing::warn!(category = %category.key, path = %rel, %reason, "unreadable file");
                stats.files_unreadable += 1;
                entries.push(FileEntry {
                    path: rel,
                    size,
                    status: FileStatus::Unreadable(reason),
                    lines: Vec::new(),
                    original_lines: 0,
                    truncated: false,
                });
                continue;
            }
        };
        if text.trim().is_empty() {
            entries.push(FileEntry {
                path: rel,
                size,
                status: FileStatus::Empty,
                lines: Vec::new(),
                original_lines: 0,
                truncated: false,
            });
            continue;
        }

        let all: Vec<&str> = text.lines().collect();
        let (kept, truncated) = truncate_tail(&all, category.max_lines);
        tracing::debug!(
            category = %category.key,
            path = %rel,
            lines = all.len(),
            kept = kept.len(),
            truncated,
            "collected file"
        );
        stats.files_found += 1;
        stats.lines_emitted += kept.len();
        if truncated {
            stats.files_truncated += 1;
        }
        entries.push(FileEntry {
            path: rel,
            size,
            status: FileStatus::Included,
            lines: kept.into_iter().map(str::to_string).collect(),
            original_lines: all.len(),
            truncated,
        });
    }

    CollectedContent {
        key: category.key.clone(),
        title: category.title.clone(),
        description: category.description.clone(),
        max_lines: category.max_lines,
        entries,
        missing: resolution.missing,
        stats,
    }
}

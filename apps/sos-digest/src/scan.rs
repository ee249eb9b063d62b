//! Issue scanner: evaluates compiled checks against their source files.
//!
//! Only matching checks produce findings, in check order. A missing source
//! skips its check silently; absence of a file is not a signal.

use crate::checks::CompiledCheck;
use crate::collect::read_text;
use crate::models::{IssueFinding, ScanReport};
use crate::resolve::resolve_file;
use crate::truncate::truncate_tail;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default bound on excerpt lines per finding.
pub const DEFAULT_SCAN_MAX_LINES: usize = 40_000;

struct SourceText {
    text: String,
    lower: String,
}

/// Run `checks` against the sosreport at `root`.
///
/// Source texts are read in full (predicates may need whole-file context) and
/// cached for the duration of the pass, since several checks share sources.
pub fn scan(checks: &[CompiledCheck], root: &Path, max_excerpt_lines: usize) -> ScanReport {
    let mut report = ScanReport::default();
    let mut cache: HashMap<PathBuf, Result<SourceText, String>> = HashMap::new();

    for check in checks {
        let def = &check.def;
        let Some(path) = resolve_file(root, &def.source) else {
            tracing::debug!(check = %def.name, source = %def.source, "source not present; skipping");
            report.skipped_missing += 1;
            continue;
        };
        let source = cache.entry(path).or_insert_with_key(|p| {
            read_text(p).map(|text| SourceText {
                lower: text.to_lowercase(),
                text,
            })
        });
        let source = match source {
            Ok(s) => s,
            Err(reason) => {
                tracing::warn!(check = %def.name, source = %def.source, %reason, "source unreadable; skipping");
                if !report.unreadable.iter().any(|(s, _)| s == &def.source) {
                    report.unreadable.push((def.source.clone(), reason.clone()));
                }
                continue;
            }
        };

        report.evaluated += 1;
        if !check.matches(&source.text, &source.lower) {
            continue;
        }

        let lines: Vec<&str> = source.text.lines().collect();
        let extracted = check.extract(&lines);
        let (excerpt, excerpt_truncated) = truncate_tail(&extracted, max_excerpt_lines);
        let no_lines_extracted = excerpt.iter().all(|l| l.trim().is_empty());
        tracing::info!(
            check = %def.name,
            severity = def.severity.as_str(),
            lines = excerpt.len(),
            "issue flagged"
        );
        report.findings.push(IssueFinding {
            name: def.name.clone(),
            source: def.source.clone(),
            severity: def.severity,
            description: def.description.clone(),
            filter_terms: def.filter_terms.clone(),
            excerpt: if no_lines_extracted { Vec::new() } else { excerpt },
            no_lines_extracted,
            excerpt_truncated,
        });
    }
    report
}

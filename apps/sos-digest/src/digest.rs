//! Document generation: one pass over every category, then the issue scan.
//!
//! Each document is rendered in memory and written through a temporary file
//! in the output directory, then renamed into place. A failure on one
//! document is recorded and the run continues with the rest.

use crate::collect::collect;
use crate::error::{DigestError, Result};
use crate::models::{CollectStats, ScanReport};
use crate::render::{render_category, render_issues, RenderOptions, RenderedDocument};
use crate::rules::RuleSet;
use crate::scan::scan;
use crate::sos;
use crate::utils::base_name;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub max_words: usize,
    pub scan_max_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Outcome for a single output document.
pub struct DocumentOutcome {
    pub file: String,
    pub title: String,
    pub bytes: Option<u64>,
    pub error: Option<String>,
    pub words_truncated: bool,
    /// Collection counters; absent for the findings document.
    pub stats: Option<CollectStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub sos_root: String,
    pub output_dir: String,
    pub documents: Vec<DocumentOutcome>,
    pub scan: ScanReport,
}

impl GenerateReport {
    pub fn failures(&self) -> usize {
        self.documents.iter().filter(|d| d.error.is_some()).count()
    }
}

fn render_options(sos_root: &Path, max_words: usize) -> RenderOptions {
    RenderOptions {
        max_words,
        sos_name: base_name(sos_root),
        rhel_version: sos::detect_rhel_version(sos_root),
    }
}

/// Permission bits of written documents on Unix.
#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o644;

/// Write `text` to `out_dir/file_name` atomically; returns the byte count.
pub fn write_document(out_dir: &Path, file_name: &str, text: &str) -> Result<u64> {
    let dest: PathBuf = out_dir.join(file_name);
    let wrap = |source: std::io::Error| DigestError::Write {
        path: dest.clone(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(out_dir).map_err(wrap)?;
    tmp.write_all(text.as_bytes()).map_err(wrap)?;
    // Temp files are created 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(DOCUMENT_MODE))
            .map_err(wrap)?;
    }
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(&dest).map_err(|e| wrap(e.error))?;
    Ok(text.len() as u64)
}

fn write_outcome(
    out_dir: &Path,
    doc: RenderedDocument,
    stats: Option<CollectStats>,
) -> DocumentOutcome {
    let (bytes, error) = match write_document(out_dir, &doc.file_name, &doc.text) {
        Ok(n) => {
            tracing::info!(file = %doc.file_name, bytes = n, "document written");
            (Some(n), None)
        }
        Err(e) => {
            tracing::warn!(file = %doc.file_name, error = %e, "document not written");
            (None, Some(e.to_string()))
        }
    };
    DocumentOutcome {
        file: doc.file_name,
        title: doc.title,
        bytes,
        error,
        words_truncated: doc.words_truncated,
        stats,
    }
}

/// Scan only, rendering nothing to disk.
pub fn scan_only(sos_root: &Path, rules: &RuleSet, opts: &DigestOptions) -> ScanReport {
    scan(&rules.checks, sos_root, opts.scan_max_lines)
}

/// Render the findings document without writing it.
pub fn render_findings(
    sos_root: &Path,
    report: &ScanReport,
    opts: &DigestOptions,
) -> RenderedDocument {
    let identity = sos::system_identity(sos_root);
    render_issues(report, &identity, &render_options(sos_root, opts.max_words))
}

/// Generate every category document and the findings document into `out_dir`.
pub fn generate(
    sos_root: &Path,
    out_dir: &Path,
    rules: &RuleSet,
    opts: &DigestOptions,
) -> GenerateReport {
    let render_opts = render_options(sos_root, opts.max_words);
    let mut documents = Vec::with_capacity(rules.categories.len() + 1);

    for category in &rules.categories {
        let span = tracing::info_span!("category", key = %category.key);
        let _enter = span.enter();
        let content = collect(category, sos_root);
        let doc = render_category(&content, &render_opts);
        documents.push(write_outcome(out_dir, doc, Some(content.stats)));
    }

    let report = scan_only(sos_root, rules, opts);
    let doc = render_findings(sos_root, &report, opts);
    documents.push(write_outcome(out_dir, doc, None));

    GenerateReport {
        sos_root: sos_root.to_string_lossy().to_string(),
        output_dir: out_dir.to_string_lossy().to_string(),
        documents,
        scan: report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{compile, parse_index, RuleOverrides};
    use std::fs;
    use tempfile::tempdir;

    const INDEX: &str = r#"
[[category]]
key = "01_net"
title = "Net"
files = ["etc/hosts"]

[[category]]
key = "02_logs"
title = "Logs"
max_lines = 2
files = ["var/log/messages"]

[[issue]]
name = "OOM"
source = "var/log/messages"
description = "oom"
check = { kind = "contains_any", terms = ["oom-killer"] }
"#;

    fn rules() -> RuleSet {
        compile(
            parse_index(INDEX, Path::new("t.toml")).unwrap(),
            &RuleOverrides::default(),
        )
        .unwrap()
    }

    fn opts() -> DigestOptions {
        DigestOptions {
            max_words: 1000,
            scan_max_lines: 100,
        }
    }

    #[test]
    fn test_generate_writes_every_document_and_no_temp_files() {
        let sos = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::create_dir_all(sos.path().join("etc")).unwrap();
        fs::create_dir_all(sos.path().join("var/log")).unwrap();
        fs::write(sos.path().join("etc/hosts"), "127.0.0.1 localhost\n").unwrap();
        fs::write(
            sos.path().join("var/log/messages"),
            "a\nb\nkernel: oom-killer invoked\n",
        )
        .unwrap();

        let report = generate(sos.path(), out.path(), &rules(), &opts());
        assert_eq!(report.failures(), 0);
        let mut names: Vec<String> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["00_issues_investigation.md", "01_net.md", "02_logs.md"]);

        let net = fs::read_to_string(out.path().join("01_net.md")).unwrap();
        let logs = fs::read_to_string(out.path().join("02_logs.md")).unwrap();
        assert!(net.contains("127.0.0.1 localhost"));
        assert!(!net.contains("oom-killer"));
        assert!(!logs.contains("localhost"));
        assert!(logs.contains("showing the last 2 of 3 lines"));
        assert_eq!(report.scan.findings.len(), 1);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let sos = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::create_dir_all(sos.path().join("etc")).unwrap();
        fs::write(sos.path().join("etc/hosts"), "::1 localhost\n").unwrap();
        generate(sos.path(), out.path(), &rules(), &opts());
        let first = fs::read_to_string(out.path().join("01_net.md")).unwrap();
        let first_issues =
            fs::read_to_string(out.path().join("00_issues_investigation.md")).unwrap();
        generate(sos.path(), out.path(), &rules(), &opts());
        assert_eq!(first, fs::read_to_string(out.path().join("01_net.md")).unwrap());
        assert_eq!(
            first_issues,
            fs::read_to_string(out.path().join("00_issues_investigation.md")).unwrap()
        );
    }

    #[test]
    fn test_write_failure_is_recorded_per_document() {
        let sos = tempdir().unwrap();
        let out = tempdir().unwrap();
        let gone = out.path().join("removed");
        let report = generate(sos.path(), &gone, &rules(), &opts());
        assert_eq!(report.documents.len(), 3);
        assert_eq!(report.failures(), 3);
        assert!(report.documents.iter().all(|d| d.bytes.is_none()));
    }

    #[test]
    fn test_builtin_rules_produce_fourteen_documents() {
        let sos = tempdir().unwrap();
        let out = tempdir().unwrap();
        let root = sos.path();
        for dir in ["etc", "var/log", "sos_commands/kernel", "sos_commands/networking"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("etc/redhat-release"), "Red Hat Enterprise Linux release 9.2 (Plow)\n").unwrap();
        fs::write(root.join("etc/hosts"), "10.0.0.5 db01\n").unwrap();
        let mut messages = String::new();
        for i in 1..=100 {
            if i == 42 {
                messages.push_str("kernel: java invoked oom-killer: Out of memory: Killed process 4242 (java)\n");
            } else {
                messages.push_str(&format!("systemd[1]: routine line {}\n", i));
            }
        }
        fs::write(root.join("var/log/messages"), messages).unwrap();

        let builtin = compile(
            crate::rules::builtin_index().unwrap(),
            &RuleOverrides::default(),
        )
        .unwrap();
        let opts = DigestOptions {
            max_words: crate::render::DEFAULT_MAX_WORDS,
            scan_max_lines: crate::scan::DEFAULT_SCAN_MAX_LINES,
        };
        let report = generate(root, out.path(), &builtin, &opts);
        assert_eq!(report.failures(), 0);
        let md: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "md").unwrap_or(false))
            .collect();
        assert_eq!(md.len(), 14);

        let overview = fs::read_to_string(out.path().join("01_system_overview.md")).unwrap();
        let net = fs::read_to_string(out.path().join("02_networking.md")).unwrap();
        let log = fs::read_to_string(out.path().join("08a_log_messages.md")).unwrap();
        assert!(overview.contains("release 9.2"));
        assert!(!overview.contains("db01"));
        assert!(net.contains("db01"));
        assert!(log.contains("Killed process 4242"));

        let oom = report
            .scan
            .findings
            .iter()
            .find(|f| f.name == "OOM Killer Events")
            .unwrap();
        assert!(oom.excerpt.iter().any(|l| l.contains("Killed process 4242")));
        let issues = fs::read_to_string(out.path().join("00_issues_investigation.md")).unwrap();
        assert!(issues.contains("## OOM Killer Events"));
    }

    #[cfg(unix)]
    #[test]
    fn test_documents_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let out = tempdir().unwrap();
        write_document(out.path(), "01_net.md", "# Net\n").unwrap();
        let mode = fs::metadata(out.path().join("01_net.md"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

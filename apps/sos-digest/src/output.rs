//! Output rendering for generate, scan, and list commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::digest::GenerateReport;
use crate::models::policy::Severity;
use crate::models::ScanReport;
use crate::rules::RuleSet;
use crate::utils::human_size;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
    }
}

fn severity_tag(sev: Severity, color: bool) -> String {
    let tag = format!("⟦{}⟧", sev.as_str());
    if !color {
        return tag;
    }
    match sev {
        Severity::Critical => tag.red().bold().to_string(),
        Severity::Warning => tag.yellow().bold().to_string(),
        Severity::Info => tag.blue().bold().to_string(),
    }
}

/// Print the per-document results of a generate run.
pub fn print_generate(report: &GenerateReport, output: &str) {
    if output == "json" {
        print_json(&compose_generate_json(report));
        return;
    }
    let color = use_colors(output);
    for d in &report.documents {
        match (&d.bytes, &d.error) {
            (Some(n), _) => {
                let mut line = format!("📄 {} ({})", d.file, human_size(*n));
                if let Some(s) = &d.stats {
                    line.push_str(&format!(
                        " files={} missing={} truncated={}",
                        s.files_found, s.files_missing, s.files_truncated
                    ));
                }
                if d.words_truncated {
                    line.push_str(" [word limit]");
                }
                if color {
                    println!("{} {}", "✔".green(), line);
                } else {
                    println!("✔ {}", line);
                }
            }
            (None, err) => {
                let msg = format!("{}: {}", d.file, err.as_deref().unwrap_or("not written"));
                if color {
                    println!("{} {}", "✖".red(), msg.red());
                } else {
                    println!("✖ {}", msg);
                }
            }
        }
    }
    let summary = format!(
        "— Summary — documents={} failed={} issues={} output={}",
        report.documents.len(),
        report.failures(),
        report.scan.findings.len(),
        report.output_dir
    );
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

/// Print scan findings.
pub fn print_scan(report: &ScanReport, output: &str) {
    if output == "json" {
        print_json(&compose_scan_json(report));
        return;
    }
    let color = use_colors(output);
    for f in &report.findings {
        let detail = if f.no_lines_extracted {
            "matched, no representative lines".to_string()
        } else {
            format!("{} lines", f.excerpt.len())
        };
        println!(
            "{} {} ❲{}❳ — {}",
            severity_tag(f.severity, color),
            if color { f.name.bold().to_string() } else { f.name.clone() },
            f.source,
            detail
        );
    }
    for (src, reason) in &report.unreadable {
        eprintln!("{} unreadable source {}: {}", crate::utils::note_prefix(), src, reason);
    }
    let summary = format!(
        "— Summary — critical={} warnings={} infos={} evaluated={} skipped={}",
        report.count(Severity::Critical),
        report.count(Severity::Warning),
        report.count(Severity::Info),
        report.evaluated,
        report.skipped_missing
    );
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

/// Print the effective rule set.
pub fn print_list(rules: &RuleSet, output: &str) {
    if output == "json" {
        print_json(&compose_list_json(rules));
        return;
    }
    let color = use_colors(output);
    for c in &rules.categories {
        let key = format!("{}.md", c.key);
        println!(
            "{} — {} (max_lines={}, files={}, globs={})",
            if color { key.bold().to_string() } else { key },
            c.title,
            c.max_lines,
            c.files.len(),
            c.globs.len()
        );
    }
    for ch in &rules.checks {
        println!(
            "{} {} ❲{}❳",
            severity_tag(ch.def.severity, color),
            ch.def.name,
            ch.def.source
        );
    }
}

/// Compose generate JSON object (pure) for testing/snapshot purposes.
pub fn compose_generate_json(report: &GenerateReport) -> JsonVal {
    let summary = json!({
        "documents": report.documents.len(),
        "failed": report.failures(),
        "issues": report.scan.findings.len(),
    });
    json!({
        "sos_root": report.sos_root,
        "output_dir": report.output_dir,
        "documents": report.documents,
        "summary": summary,
    })
}

/// Compose scan JSON object (pure) for testing/snapshot purposes.
pub fn compose_scan_json(report: &ScanReport) -> JsonVal {
    let mut out = serde_json::to_value(report).unwrap_or(JsonVal::Null);
    if let JsonVal::Object(map) = &mut out {
        map.insert(
            "summary".into(),
            json!({
                "critical": report.count(Severity::Critical),
                "warnings": report.count(Severity::Warning),
                "infos": report.count(Severity::Info),
            }),
        );
    }
    out
}

/// Compose list JSON object (pure) for testing/snapshot purposes.
pub fn compose_list_json(rules: &RuleSet) -> JsonVal {
    let issues: Vec<_> = rules.checks.iter().map(|c| &c.def).collect();
    json!({
        "categories": rules.categories,
        "issues": issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DocumentOutcome;
    use crate::models::IssueFinding;
    use crate::rules::{builtin_index, compile, RuleOverrides};

    #[test]
    fn test_compose_generate_json_counts_failures() {
        let report = GenerateReport {
            sos_root: "/tmp/sos".into(),
            output_dir: "/tmp/out".into(),
            documents: vec![
                DocumentOutcome {
                    file: "01_system_overview.md".into(),
                    title: "System Overview".into(),
                    bytes: Some(10),
                    error: None,
                    words_truncated: false,
                    stats: None,
                },
                DocumentOutcome {
                    file: "02_networking.md".into(),
                    title: "Networking".into(),
                    bytes: None,
                    error: Some("failed to write".into()),
                    words_truncated: false,
                    stats: None,
                },
            ],
            scan: ScanReport::default(),
        };
        let out = compose_generate_json(&report);
        assert_eq!(out["summary"]["documents"], 2);
        assert_eq!(out["summary"]["failed"], 1);
        assert_eq!(out["documents"][1]["error"], "failed to write");
        assert!(out["documents"][0]["error"].is_null());
    }

    #[test]
    fn test_compose_scan_json_shape() {
        let report = ScanReport {
            findings: vec![IssueFinding {
                name: "OOM Killer Events".into(),
                source: "var/log/messages".into(),
                severity: Severity::Critical,
                description: "d".into(),
                filter_terms: None,
                excerpt: vec!["oom-killer".into()],
                no_lines_extracted: false,
                excerpt_truncated: false,
            }],
            evaluated: 1,
            skipped_missing: 0,
            unreadable: vec![],
        };
        let out = compose_scan_json(&report);
        assert_eq!(out["summary"]["critical"], 1);
        assert_eq!(out["findings"][0]["severity"], "critical");
        assert_eq!(out["findings"][0]["excerpt"][0], "oom-killer");
    }

    #[test]
    fn test_compose_list_json_uses_index_field_names() {
        let rules = compile(builtin_index().unwrap(), &RuleOverrides::default()).unwrap();
        let out = compose_list_json(&rules);
        assert_eq!(out["categories"][0]["key"], "01_system_overview");
        assert_eq!(out["issues"][0]["check"]["kind"], "lacks_all");
    }
}

//! Markdown rendering for category documents and the findings report.
//!
//! Output is a pure function of its inputs (no timestamps, no host data), so
//! re-running over the same sosreport yields byte-identical documents.

use crate::models::policy::Severity;
use crate::models::{CollectedContent, FileStatus, IssueFinding, ScanReport};
use crate::rules::ISSUES_KEY;
use crate::truncate::truncate_words;
use crate::utils::{count_words, heading_anchor, human_size};
use serde::Serialize;
use std::fmt::Write as _;

/// Words per document accepted by the target AI tools, with a safety margin.
pub const DEFAULT_MAX_WORDS: usize = 499_000;

/// Word allowance reserved for the truncation notice itself.
const NOTICE_WORDS: usize = 20;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub max_words: usize,
    /// Display name of the sosreport (its directory name).
    pub sos_name: String,
    pub rhel_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub file_name: String,
    pub title: String,
    /// Section headings in document order.
    pub sections: Vec<String>,
    #[serde(skip)]
    pub text: String,
    pub words_truncated: bool,
}

/// Backtick fence longer than any backtick run inside `lines`.
fn fence_for<S: AsRef<str>>(lines: &[S]) -> String {
    let mut longest = 0usize;
    for line in lines {
        let mut run = 0usize;
        for ch in line.as_ref().chars() {
            if ch == '`' {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
    }
    "`".repeat(longest.max(2) + 1)
}

fn push_block<S: AsRef<str>>(out: &mut String, lines: &[S]) {
    let fence = fence_for(lines);
    let _ = writeln!(out, "{}", fence);
    for line in lines {
        let _ = writeln!(out, "{}", line.as_ref());
    }
    let _ = writeln!(out, "{}", fence);
}

/// Assemble header, body, and footer, cutting the body from the front when
/// the document would exceed `max_words`.
fn assemble(header: &str, body: &str, footer: &str, max_words: usize) -> (String, bool) {
    let budget = max_words
        .saturating_sub(count_words(header))
        .saturating_sub(count_words(footer))
        .saturating_sub(NOTICE_WORDS);
    let fitted = truncate_words(body, budget);
    if !fitted.truncated {
        return (format!("{}{}{}", header, body, footer), false);
    }
    tracing::warn!(
        words = count_words(body),
        kept = fitted.kept_words,
        "document body exceeded word limit; keeping the tail"
    );
    let mut notice = format!(
        "\n... [TRUNCATED: content exceeded the word limit, showing the last {} words] ...\n\n",
        fitted.kept_words
    );
    // Reopen the code block the cut landed in, if any.
    let dropped = &body[..body.len() - fitted.text.len()];
    if let Some(fence) = open_fence(dropped) {
        notice.push_str(fence);
        notice.push('\n');
    }
    (format!("{}{}{}{}", header, notice, fitted.text, footer), true)
}

/// Fence of the code block still open at the end of `text`, if any.
fn open_fence(text: &str) -> Option<&str> {
    let mut open: Option<&str> = None;
    for line in text.lines() {
        let is_fence = line.len() >= 3 && line.chars().all(|c| c == '`');
        if !is_fence {
            continue;
        }
        open = match open {
            None => Some(line),
            Some(f) if f == line => None,
            keep => keep,
        };
    }
    open
}

fn truncation_label(original: usize, kept: usize) -> String {
    format!("showing the last {} of {} lines (truncated)", kept, original)
}

/// Render one category document.
pub fn render_category(content: &CollectedContent, opts: &RenderOptions) -> RenderedDocument {
    let mut header = String::new();
    let _ = writeln!(header, "# {}\n", content.title);
    if !content.description.trim().is_empty() {
        let _ = writeln!(header, "> {}\n", content.description.trim());
    }
    let _ = writeln!(header, "> SOS Report: `{}`", opts.sos_name);
    let _ = writeln!(header, "> Line budget per file: {}\n", content.max_lines);
    header.push_str("---\n\n");

    let mut sections = Vec::new();
    let mut body = String::new();
    let included: Vec<_> = content.included().collect();

    if included.is_empty() {
        body.push_str(if content.entries.is_empty() {
            "*No matching files found in this sosreport.*\n\n"
        } else {
            "*No readable files with content found for this category.*\n\n"
        });
    } else {
        sections.push("Contents".to_string());
        body.push_str("## Contents\n\n");
        for e in &included {
            let detail = if e.truncated {
                truncation_label(e.original_lines, e.lines.len())
            } else {
                format!("{} lines", e.original_lines)
            };
            let _ = writeln!(body, "- [{}](#{}): {}", e.path, heading_anchor(&e.path), detail);
        }
        body.push('\n');

        for e in &included {
            sections.push(e.path.clone());
            let _ = writeln!(body, "## {}\n", e.path);
            let lines = if e.truncated {
                truncation_label(e.original_lines, e.lines.len())
            } else {
                format!("Lines: {}", e.original_lines)
            };
            let _ = writeln!(body, "*Size: {} | {}*\n", human_size(e.size), lines);
            push_block(&mut body, &e.lines);
            body.push('\n');
        }
    }

    let unreadable: Vec<_> = content
        .entries
        .iter()
        .filter_map(|e| match &e.status {
            FileStatus::Unreadable(reason) => Some((e.path.as_str(), reason.as_str())),
            _ => None,
        })
        .collect();
    let empty: Vec<_> = content
        .entries
        .iter()
        .filter(|e| e.status == FileStatus::Empty)
        .map(|e| e.path.as_str())
        .collect();
    if !content.missing.is_empty() || !unreadable.is_empty() || !empty.is_empty() {
        sections.push("Notes".to_string());
        body.push_str("## Notes\n\n");
        if !content.missing.is_empty() {
            body.push_str("**Missing files (not present in this sosreport):**\n\n");
            for m in &content.missing {
                let _ = writeln!(body, "- `{}`", m);
            }
            body.push('\n');
        }
        if !unreadable.is_empty() {
            body.push_str("**Unreadable files:**\n\n");
            for (p, reason) in &unreadable {
                let _ = writeln!(body, "- `{}`: [could not read: {}]", p, reason);
            }
            body.push('\n');
        }
        if !empty.is_empty() {
            body.push_str("**Empty files:**\n\n");
            for p in &empty {
                let _ = writeln!(body, "- `{}`", p);
            }
            body.push('\n');
        }
    }

    let footer = format!("---\n*Total files included: {}*\n", included.len());
    let (text, words_truncated) = assemble(&header, &body, &footer, opts.max_words);
    RenderedDocument {
        file_name: format!("{}.md", content.key),
        title: content.title.clone(),
        sections,
        text,
        words_truncated,
    }
}

fn render_finding(body: &mut String, f: &IssueFinding) {
    let _ = writeln!(body, "## {}\n", f.name);
    let _ = writeln!(body, "**Source:** `{}`  ", f.source);
    let _ = writeln!(body, "**Severity:** {}  ", f.severity.as_str());
    let _ = writeln!(body, "**What this means:** {}\n", f.description);
    if f.no_lines_extracted {
        let terms = f.filter_terms.as_deref().unwrap_or("the specified patterns");
        let _ = writeln!(
            body,
            "*Matched, no representative lines extracted: searched `{}` for {}.*",
            f.source, terms
        );
    } else {
        if f.excerpt_truncated {
            let _ = writeln!(body, "*Excerpt truncated: showing the last {} lines.*\n", f.excerpt.len());
        }
        push_block(body, &f.excerpt);
    }
    body.push_str("\n---\n\n");
}

/// Render `00_issues_investigation.md`.
///
/// `identity` holds `(relative path, lines)` for the system identity block.
pub fn render_issues(
    report: &ScanReport,
    identity: &[(String, Vec<String>)],
    opts: &RenderOptions,
) -> RenderedDocument {
    let mut sections = Vec::new();
    let mut header = String::new();
    header.push_str("# Issues Investigation Report\n\n");
    header.push_str("> Automated scan of the sosreport for common problems and red flags.\n");
    let _ = writeln!(header, "> SOS Report: `{}`", opts.sos_name);
    if let Some(v) = opts.rhel_version {
        let _ = writeln!(header, "> RHEL major version: {}", v);
    }
    header.push_str("\n---\n\n");

    if !identity.is_empty() {
        sections.push("System Identity".to_string());
        header.push_str("## System Identity\n\n");
        for (path, lines) in identity {
            let _ = writeln!(header, "**{}:**\n", path);
            push_block(&mut header, lines);
            header.push('\n');
        }
        header.push_str("---\n\n");
    }

    sections.push("Summary".to_string());
    let mut summary = String::new();
    summary.push_str("## Summary\n\n");
    let _ = writeln!(
        summary,
        "- **Issues flagged:** {} (critical: {}, warning: {}, info: {})",
        report.findings.len(),
        report.count(Severity::Critical),
        report.count(Severity::Warning),
        report.count(Severity::Info)
    );
    let _ = writeln!(summary, "- **Checks evaluated:** {}", report.evaluated);
    let _ = writeln!(
        summary,
        "- **Checks skipped (source not present):** {}",
        report.skipped_missing
    );
    for (src, reason) in &report.unreadable {
        let _ = writeln!(summary, "- **Unreadable source:** `{}` ({})", src, reason);
    }
    summary.push('\n');
    if report.findings.is_empty() {
        summary.push_str("*No issues flagged by the automated checks.*\n\n");
    }
    for sev in Severity::ALL {
        let group: Vec<_> = report.findings.iter().filter(|f| f.severity == sev).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(summary, "### {}\n", sev.heading());
        for f in group {
            let _ = writeln!(
                summary,
                "- [{}](#{}): {}",
                f.name,
                heading_anchor(&f.name),
                f.description
            );
        }
        summary.push('\n');
    }
    summary.push_str("---\n\n");
    header.push_str(&summary);

    let mut body = String::new();
    for f in &report.findings {
        sections.push(f.name.clone());
        render_finding(&mut body, f);
    }

    sections.push("Recommended Next Steps".to_string());
    let footer = [
        "## Recommended Next Steps",
        "",
        "Use this file together with the subject-specific files to investigate flagged \
         issues in detail. Upload all generated markdown files to your AI assistant and \
         ask questions like:",
        "",
        "- \"What are the critical issues on this system?\"",
        "- \"Explain the SELinux denials and suggest fixes\"",
        "- \"Is the storage healthy? Any signs of disk failure?\"",
        "- \"Are there any security concerns based on the audit log?\"",
        "- \"What services are failing and why?\"",
        "- \"Compare this system config against RHEL best practices\"",
        "",
    ]
    .join("\n");

    let (text, words_truncated) = assemble(&header, &body, &footer, opts.max_words);
    RenderedDocument {
        file_name: format!("{}.md", ISSUES_KEY),
        title: "Issues Investigation Report".to_string(),
        sections,
        text,
        words_truncated,
    }
}

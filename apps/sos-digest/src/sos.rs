//! Sosreport inspection: layout heuristics and host identity.

use crate::collect::read_text;
use crate::resolve::resolve_file;
use crate::truncate::truncate_tail;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// Entries commonly present at the top of a sosreport.
pub const SOS_INDICATORS: [&str; 13] = [
    "sos_commands",
    "etc",
    "proc",
    "var",
    "sos_logs",
    "sos_reports",
    "installed-rpms",
    "uname",
    "hostname",
    "uptime",
    "date",
    "free",
    "version.txt",
];

/// Files quoted in the "System Identity" block of the findings document.
pub const IDENTITY_FILES: [&str; 4] = [
    "etc/redhat-release",
    "sos_commands/kernel/uname_-a",
    "sos_commands/host/hostnamectl",
    "uptime",
];

const IDENTITY_MAX_LINES: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct SosInfo {
    pub indicators: Vec<String>,
    pub valid: bool,
    pub rhel_version: Option<u32>,
}

/// Inspect `root`. It looks like a sosreport when `sos_commands` plus two
/// other indicators exist, or any four indicators.
pub fn inspect(root: &Path) -> SosInfo {
    let indicators: Vec<String> = SOS_INDICATORS
        .iter()
        .filter(|name| root.join(name).exists())
        .map(|name| name.to_string())
        .collect();
    let has_commands = indicators.iter().any(|i| i == "sos_commands");
    let valid = (has_commands && indicators.len() >= 3) || indicators.len() >= 4;
    SosInfo {
        indicators,
        valid,
        rhel_version: detect_rhel_version(root),
    }
}

/// Major version from `etc/redhat-release`, e.g. `... release 9.3 (Plow)` gives 9.
pub fn detect_rhel_version(root: &Path) -> Option<u32> {
    let path = resolve_file(root, "etc/redhat-release")?;
    let text = read_text(&path).ok()?;
    let re = Regex::new(r"release\s+(\d+)").ok()?;
    re.captures(&text)?.get(1)?.as_str().parse().ok()
}

/// `(path, lines)` for each identity file present, last 20 lines each.
pub fn system_identity(root: &Path) -> Vec<(String, Vec<String>)> {
    IDENTITY_FILES
        .iter()
        .filter_map(|rel| {
            let path = resolve_file(root, rel)?;
            let text = read_text(&path).ok()?;
            let lines: Vec<String> = text.trim().lines().map(str::to_string).collect();
            if lines.is_empty() {
                return None;
            }
            Some((rel.to_string(), truncate_tail(&lines, IDENTITY_MAX_LINES).0))
        })
        .collect()
}

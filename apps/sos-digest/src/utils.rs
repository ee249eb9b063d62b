//! Small helpers shared across modules: message prefixes, paths, text.

use owo_colors::OwoColorize;
use std::path::Path;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".yellow().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Path of `path` relative to `root`, always `/`-separated.
pub fn rel_to_root(path: &Path, root: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Display name of a directory (its last component).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// GitHub-style heading anchor: lowercased, punctuation other than `-`/`_`
/// dropped, each space becomes `-`.
pub fn heading_anchor(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Byte size as KB with one decimal, e.g. `1.5 KB`.
pub fn human_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_heading_anchor_matches_github_slugs() {
        assert_eq!(
            heading_anchor("Kernel Errors / Panics / Oops in dmesg"),
            "kernel-errors--panics--oops-in-dmesg"
        );
        assert_eq!(heading_anchor("Hardware Errors (MCE)"), "hardware-errors-mce");
        assert_eq!(heading_anchor("etc/hostname"), "etchostname");
        assert_eq!(
            heading_anchor("sos_commands/systemd/systemctl_list-units_--failed"),
            "sos_commandssystemdsystemctl_list-units_--failed"
        );
    }

    #[test]
    fn test_rel_to_root_uses_forward_slashes() {
        let root = PathBuf::from("/tmp/sos");
        let p = root.join("etc").join("hosts");
        assert_eq!(rel_to_root(&p, &root), "etc/hosts");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(0), "0.0 KB");
    }
}

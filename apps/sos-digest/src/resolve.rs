//! Path resolution against the sosreport root.
//!
//! Explicit files come first in listed order, then glob matches in pattern
//! order (each pattern yields paths in sorted order). Directories expand to
//! the files they contain. A path reachable twice keeps its first position.

use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Existing files, deduplicated, in resolution order.
    pub found: Vec<PathBuf>,
    /// Entries of `files` that do not exist, as written in the definition.
    pub missing: Vec<String>,
}

/// Strip one leading separator so `/etc/hosts` and `etc/hosts` are the same entry.
pub fn normalize_rel(rel: &str) -> &str {
    rel.strip_prefix('/').unwrap_or(rel)
}

/// Resolve a single relative path to an existing regular file.
pub fn resolve_file(root: &Path, rel: &str) -> Option<PathBuf> {
    let full = root.join(normalize_rel(rel));
    full.is_file().then_some(full)
}

/// Resolve explicit `files` and `globs` under `root`.
pub fn resolve(root: &Path, files: &[String], globs: &[String]) -> Resolution {
    let mut out = Resolution::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for rel in files {
        let full = root.join(normalize_rel(rel));
        if full.is_file() {
            push_unique(&mut out.found, &mut seen, full);
        } else if full.is_dir() {
            expand_dir(&full, &mut out.found, &mut seen);
        } else {
            tracing::debug!(path = %rel, "listed file not present");
            out.missing.push(rel.clone());
        }
    }

    let escaped_root = Pattern::escape(&root.to_string_lossy());
    for pat in globs {
        let pattern = format!(
            "{}/{}",
            escaped_root.trim_end_matches('/'),
            normalize_rel(pat)
        );
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(pattern = %pat, error = %e, "skipping invalid glob pattern");
                continue;
            }
        };
        for entry in entries {
            match entry {
                Ok(p) if p.is_file() => push_unique(&mut out.found, &mut seen, p),
                Ok(p) if p.is_dir() => expand_dir(&p, &mut out.found, &mut seen),
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "glob entry not readable"),
            }
        }
    }
    out
}

fn push_unique(found: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, p: PathBuf) {
    if seen.insert(p.clone()) {
        found.push(p);
    }
}

fn expand_dir(dir: &Path, found: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.path().is_file() {
            push_unique(found, seen, entry.into_path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"x\n").unwrap();
    }

    fn rels(root: &Path, r: &Resolution) -> Vec<String> {
        r.found
            .iter()
            .map(|p| crate::utils::rel_to_root(p, root))
            .collect()
    }

    #[test]
    fn test_empty_inputs_resolve_to_nothing() {
        let dir = tempdir().unwrap();
        let r = resolve(dir.path(), &[], &["nothing/*.conf".to_string()]);
        assert!(r.found.is_empty());
        assert!(r.missing.is_empty());
    }

    #[test]
    fn test_files_first_then_globs_and_dedup() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "etc/hosts");
        touch(root, "etc/sysctl.d/a.conf");
        touch(root, "etc/sysctl.d/b.conf");
        let r = resolve(
            root,
            &["etc/sysctl.d/b.conf".into(), "/etc/hosts".into()],
            &["etc/sysctl.d/*.conf".into(), "etc/hosts".into()],
        );
        assert_eq!(
            rels(root, &r),
            vec!["etc/sysctl.d/b.conf", "etc/hosts", "etc/sysctl.d/a.conf"]
        );
    }

    #[test]
    fn test_missing_listed_file_is_recorded() {
        let dir = tempdir().unwrap();
        let r = resolve(dir.path(), &["missing/file.txt".into()], &[]);
        assert!(r.found.is_empty());
        assert_eq!(r.missing, vec!["missing/file.txt".to_string()]);
    }

    #[test]
    fn test_directories_expand_recursively_and_double_star_globs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "etc/pam.d/sshd");
        touch(root, "etc/pam.d/nested/login");
        touch(root, "var/log/sa/sar01");
        let r = resolve(root, &["etc/pam.d".into()], &["var/**/sar*".into()]);
        assert_eq!(
            rels(root, &r),
            vec!["etc/pam.d/nested/login", "etc/pam.d/sshd", "var/log/sa/sar01"]
        );
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("sosreport-[host]");
        touch(&root, "etc/yum.repos.d/rhel.repo");
        let r = resolve(&root, &[], &["etc/yum.repos.d/*.repo".into()]);
        assert_eq!(rels(&root, &r), vec!["etc/yum.repos.d/rhel.repo"]);
    }

    #[test]
    fn test_resolve_file_strips_leading_separator() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "var/log/messages");
        assert!(resolve_file(dir.path(), "/var/log/messages").is_some());
        assert!(resolve_file(dir.path(), "var/log/secure").is_none());
        assert!(resolve_file(dir.path(), "var/log").is_none());
    }
}

//! Rule index loading, overrides, and validation.
//!
//! All validation happens here, before any sosreport file is opened. The
//! resulting `RuleSet` is immutable and passed explicitly to the engine.

use crate::checks::CompiledCheck;
use crate::error::{DigestError, Result};
use crate::models::index::{CategoryDefinition, Index};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path};

/// Rule index compiled into the binary.
pub const BUILTIN_INDEX: &str = include_str!("../defaults/index.toml");

/// File stem of the findings document.
pub const ISSUES_KEY: &str = "00_issues_investigation";

#[derive(Debug, Default, Clone)]
/// Per-category adjustments from the config file (`[categories.<key>]`).
pub struct CategoryOverride {
    pub max_lines: Option<usize>,
    pub files: Vec<String>,
    pub globs: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RuleOverrides {
    /// Keyed by category; applied in key order.
    pub categories: BTreeMap<String, CategoryOverride>,
    /// Issue names removed from the run.
    pub ignore_issues: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    pub categories: Vec<CategoryDefinition>,
    pub checks: Vec<CompiledCheck>,
}

/// Parse the built-in index.
pub fn builtin_index() -> Result<Index> {
    parse_index(BUILTIN_INDEX, Path::new("<builtin>"))
}

/// Load an index from `path`, or the built-in one when `None`.
pub fn load_index(path: Option<&Path>) -> Result<Index> {
    let Some(path) = path else {
        return builtin_index();
    };
    let text = fs::read_to_string(path).map_err(|source| DigestError::IndexRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_index(&text, path)
}

pub fn parse_index(text: &str, origin: &Path) -> Result<Index> {
    toml::from_str(text).map_err(|e| DigestError::IndexParse {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })
}

fn escapes_root(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

fn validate_category(c: &CategoryDefinition, seen: &mut HashSet<String>) -> Result<()> {
    let label = format!("category '{}'", c.key);
    if c.key.is_empty()
        || !c
            .key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(DigestError::config(
            label,
            "key must be non-empty and use only [A-Za-z0-9_-]",
        ));
    }
    if c.key == ISSUES_KEY {
        return Err(DigestError::config(label, "key is reserved for the findings document"));
    }
    if !seen.insert(c.key.clone()) {
        return Err(DigestError::config(label, "duplicate key"));
    }
    if c.title.trim().is_empty() {
        return Err(DigestError::config(label, "title must not be empty"));
    }
    if c.max_lines == 0 {
        return Err(DigestError::config(label, "max_lines must be positive"));
    }
    for p in c.files.iter().chain(c.globs.iter()) {
        if p.trim().is_empty() || escapes_root(p) {
            return Err(DigestError::config(
                label,
                format!("path '{}' must be non-empty and stay under the sosreport root", p),
            ));
        }
    }
    for g in &c.globs {
        if let Err(e) = glob::Pattern::new(g) {
            return Err(DigestError::config(label, format!("invalid glob '{}': {}", g, e)));
        }
    }
    Ok(())
}

/// Apply overrides, validate every definition, and compile the checks.
pub fn compile(index: Index, overrides: &RuleOverrides) -> Result<RuleSet> {
    let mut categories = index.categories;
    for (key, ov) in &overrides.categories {
        let Some(cat) = categories.iter_mut().find(|c| &c.key == key) else {
            return Err(DigestError::config(
                format!("category override '{}'", key),
                "no category with this key",
            ));
        };
        if let Some(max) = ov.max_lines {
            cat.max_lines = max;
        }
        cat.files.extend(ov.files.iter().cloned());
        cat.globs.extend(ov.globs.iter().cloned());
    }

    let mut seen = HashSet::new();
    for c in &categories {
        validate_category(c, &mut seen)?;
    }

    for name in &overrides.ignore_issues {
        if !index.issues.iter().any(|i| &i.name == name) {
            return Err(DigestError::config(
                format!("ignored issue '{}'", name),
                "no issue check with this name",
            ));
        }
    }

    let mut names = HashSet::new();
    let mut checks = Vec::new();
    for def in index.issues {
        let label = format!("issue '{}'", def.name);
        if def.name.trim().is_empty() {
            return Err(DigestError::config(label, "name must not be empty"));
        }
        if !names.insert(def.name.clone()) {
            return Err(DigestError::config(label, "duplicate name"));
        }
        if def.source.trim().is_empty() || escapes_root(&def.source) {
            return Err(DigestError::config(
                label,
                "source must be non-empty and stay under the sosreport root",
            ));
        }
        if overrides.ignore_issues.contains(&def.name) {
            continue;
        }
        checks.push(CompiledCheck::compile(def)?);
    }

    Ok(RuleSet { categories, checks })
}

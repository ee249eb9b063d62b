//! Configuration discovery and effective settings resolution.
//!
//! sos-digest reads `sos-digest.toml|yaml|yml` from the working directory
//! (or the file passed with `--config`) and merges it with CLI flags to
//! produce an `Effective` config.
//! Defaults:
//! - `index`: built-in rule index
//! - `output`: `human`
//! - `max_words`: 499000
//! - `scan_max_lines`: 40000
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{DigestError, Result};
use crate::render::DEFAULT_MAX_WORDS;
use crate::rules::{CategoryOverride, RuleOverrides};
use crate::scan::DEFAULT_SCAN_MAX_LINES;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["sos-digest.toml", "sos-digest.yaml", "sos-digest.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Per-category section `[categories.<key>]`.
pub struct CategoryCfg {
    pub max_lines: Option<usize>,
    /// Extra files appended to the category's list.
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Issue section `[issues]`.
pub struct IssuesCfg {
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `sos-digest.toml|yaml`.
pub struct DigestConfig {
    pub index: Option<String>,
    pub output: Option<String>,
    pub max_words: Option<usize>,
    pub scan_max_lines: Option<usize>,
    #[serde(default)]
    pub categories: Option<BTreeMap<String, CategoryCfg>>,
    #[serde(default)]
    pub issues: Option<IssuesCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    /// Config file in use, if any.
    pub config_path: Option<PathBuf>,
    /// Custom rule index; `None` means built-in.
    pub index: Option<PathBuf>,
    pub output: String,
    pub max_words: usize,
    pub scan_max_lines: usize,
    pub overrides: RuleOverrides,
}

/// First config file present in `dir`.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Load a config file, choosing the parser by extension.
pub fn load_config(path: &Path) -> Result<DigestConfig> {
    let text = fs::read_to_string(path).map_err(|e| DigestError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed: std::result::Result<DigestConfig, String> = if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    } else {
        toml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| DigestError::ConfigFile {
        path: path.to_path_buf(),
        reason,
    })
}

/// Resolve `Effective` by merging CLI flags, the config file, and defaults.
///
/// `cwd` is where config discovery happens and relative paths resolve.
pub fn resolve_effective(
    cwd: &Path,
    cli_config: Option<&str>,
    cli_index: Option<&str>,
    cli_output: Option<&str>,
) -> Result<Effective> {
    let config_path = match cli_config {
        Some(p) => Some(cwd.join(p)),
        None => discover_config(cwd),
    };
    let cfg = match config_path.as_deref() {
        Some(p) => load_config(p)?,
        None => DigestConfig::default(),
    };
    let cfg_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(cwd)
        .to_path_buf();

    // An index named on the CLI is relative to cwd; one named in the config
    // file is relative to that file.
    let index = match (cli_index, cfg.index.as_deref()) {
        (Some(p), _) => Some(cwd.join(p)),
        (None, Some(p)) => Some(cfg_dir.join(p)),
        (None, None) => None,
    };

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(DigestError::config(
            "output mode",
            format!("'{}' is not one of human|json", output),
        ));
    }

    let max_words = cfg.max_words.unwrap_or(DEFAULT_MAX_WORDS);
    let scan_max_lines = cfg.scan_max_lines.unwrap_or(DEFAULT_SCAN_MAX_LINES);
    if max_words == 0 || scan_max_lines == 0 {
        return Err(DigestError::config(
            "config limits",
            "max_words and scan_max_lines must be positive",
        ));
    }

    let overrides = RuleOverrides {
        categories: cfg
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(|(key, c)| {
                (
                    key,
                    CategoryOverride {
                        max_lines: c.max_lines,
                        files: c.files,
                        globs: c.globs,
                    },
                )
            })
            .collect(),
        ignore_issues: cfg.issues.and_then(|i| i.ignore).unwrap_or_default(),
    };

    Ok(Effective {
        config_path,
        index,
        output,
        max_words,
        scan_max_lines,
        overrides,
    })
}

//! Check policy schema used by the issue scanner.
//!
//! Key components:
//! - `Predicate`: a closed set of detection kinds evaluated against the whole
//!   source text (substring, regex, occurrence threshold, numeric threshold).
//! - `LineFilter`: optional extraction rule selecting the excerpt lines.
//! - `Severity`: presentation grouping in the findings summary.
//!
//! Substring comparisons are case-insensitive throughout.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Detection predicates supported by the scanner.
pub enum Predicate {
    /// Always matches; used for reference material worth reviewing.
    Always,
    /// Any term occurs.
    ContainsAny { terms: Vec<String> },
    /// Every term occurs.
    ContainsAll { terms: Vec<String> },
    /// Content is not blank and none of the terms occur.
    LacksAll { terms: Vec<String> },
    /// Regex matches anywhere in the content.
    Regex { pattern: String },
    /// Some term occurs more than `above` times.
    CountAbove { terms: Vec<String>, above: usize },
    /// Capture group 1 of some match parses to an integer `>= min`.
    NumberAtLeast { pattern: String, min: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Typed extraction rule applied to source lines once a predicate matched.
///
/// When neither `terms` nor `regex` is set every line is selected.
pub struct LineFilter {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub regex: Option<String>,
    /// Always keep the first line of the source (e.g. a table header).
    #[serde(default)]
    pub keep_header: bool,
    #[serde(default)]
    pub take: Option<Take>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
/// Bound applied to the selected lines.
pub enum Take {
    First(usize),
    Last(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity of a finding; orders the summary (critical first).
pub enum Severity {
    Critical,
    #[default]
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Info => "Informational",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        check: Predicate,
        #[serde(default)]
        filter: Option<LineFilter>,
    }

    #[test]
    fn test_predicate_kinds_parse_from_inline_tables() {
        let h: Holder = toml::from_str(
            r#"
check = { kind = "count_above", terms = ["defunct"], above = 5 }
filter = { terms = ["zombie"], take = { first = 100 } }
"#,
        )
        .unwrap();
        assert_eq!(
            h.check,
            Predicate::CountAbove {
                terms: vec!["defunct".into()],
                above: 5
            }
        );
        let f = h.filter.unwrap();
        assert_eq!(f.take, Some(Take::First(100)));
        assert!(!f.keep_header);
    }

    #[test]
    fn test_always_and_missing_filter() {
        let h: Holder = toml::from_str(r#"check = { kind = "always" }"#).unwrap();
        assert_eq!(h.check, Predicate::Always);
        assert!(h.filter.is_none());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let r = toml::from_str::<Holder>(r#"check = { kind = "eval", code = "rm -rf /" }"#);
        assert!(r.is_err());
    }
}

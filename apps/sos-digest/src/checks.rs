//! Compiled issue checks: predicate evaluation and excerpt extraction.
//!
//! Terms are lowercased and regexes built case-insensitive once, at compile
//! time, so evaluation only compares against the lowercased source text.

use crate::error::{DigestError, Result};
use crate::models::index::IssueCheckDefinition;
use crate::models::policy::{LineFilter, Predicate, Take};
use crate::truncate::truncate_tail;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
enum Matcher {
    Always,
    ContainsAny(Vec<String>),
    ContainsAll(Vec<String>),
    LacksAll(Vec<String>),
    Regex(Regex),
    CountAbove(Vec<String>, usize),
    NumberAtLeast(Regex, i64),
}

#[derive(Debug, Clone)]
struct CompiledFilter {
    terms: Vec<String>,
    regex: Option<Regex>,
    keep_header: bool,
    take: Option<Take>,
}

#[derive(Debug, Clone)]
/// An issue check ready to run.
pub struct CompiledCheck {
    pub def: IssueCheckDefinition,
    matcher: Matcher,
    filter: Option<CompiledFilter>,
}

fn label(def: &IssueCheckDefinition) -> String {
    format!("issue '{}'", def.name)
}

fn build_regex(def: &IssueCheckDefinition, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| DigestError::config(label(def), format!("invalid regex '{}': {}", pattern, e)))
}

fn lowered_terms(def: &IssueCheckDefinition, terms: &[String]) -> Result<Vec<String>> {
    if terms.is_empty() || terms.iter().any(|t| t.is_empty()) {
        return Err(DigestError::config(
            label(def),
            "term list must be non-empty and contain no empty terms",
        ));
    }
    Ok(terms.iter().map(|t| t.to_lowercase()).collect())
}

impl CompiledCheck {
    /// Validate and compile a definition.
    pub fn compile(def: IssueCheckDefinition) -> Result<Self> {
        let matcher = match &def.check {
            Predicate::Always => Matcher::Always,
            Predicate::ContainsAny { terms } => Matcher::ContainsAny(lowered_terms(&def, terms)?),
            Predicate::ContainsAll { terms } => Matcher::ContainsAll(lowered_terms(&def, terms)?),
            Predicate::LacksAll { terms } => Matcher::LacksAll(lowered_terms(&def, terms)?),
            Predicate::Regex { pattern } => Matcher::Regex(build_regex(&def, pattern)?),
            Predicate::CountAbove { terms, above } => {
                Matcher::CountAbove(lowered_terms(&def, terms)?, *above)
            }
            Predicate::NumberAtLeast { pattern, min } => {
                let re = build_regex(&def, pattern)?;
                if re.captures_len() < 2 {
                    return Err(DigestError::config(
                        label(&def),
                        format!("pattern '{}' needs a capture group", pattern),
                    ));
                }
                Matcher::NumberAtLeast(re, *min)
            }
        };
        let filter = match &def.filter {
            Some(f) => Some(compile_filter(&def, f)?),
            None => None,
        };
        Ok(CompiledCheck {
            def,
            matcher,
            filter,
        })
    }

    /// Evaluate the predicate. `lower` must be `text` lowercased.
    pub fn matches(&self, text: &str, lower: &str) -> bool {
        match &self.matcher {
            Matcher::Always => true,
            Matcher::ContainsAny(terms) => terms.iter().any(|t| lower.contains(t.as_str())),
            Matcher::ContainsAll(terms) => terms.iter().all(|t| lower.contains(t.as_str())),
            Matcher::LacksAll(terms) => {
                !text.trim().is_empty() && !terms.iter().any(|t| lower.contains(t.as_str()))
            }
            Matcher::Regex(re) => re.is_match(text),
            Matcher::CountAbove(terms, above) => terms
                .iter()
                .any(|t| lower.matches(t.as_str()).count() > *above),
            Matcher::NumberAtLeast(re, min) => re.captures_iter(text).any(|caps| {
                caps.get(1)
                    .and_then(|m| m.as_str().parse::<i64>().ok())
                    .is_some_and(|n| n >= *min)
            }),
        }
    }

    /// Select excerpt lines. Without a filter every line passes through.
    pub fn extract(&self, lines: &[&str]) -> Vec<String> {
        let Some(f) = &self.filter else {
            return lines.iter().map(|l| l.to_string()).collect();
        };
        let (header, body) = match (f.keep_header, lines.split_first()) {
            (true, Some((first, rest))) => (Some(*first), rest),
            _ => (None, lines),
        };
        let select_all = f.terms.is_empty() && f.regex.is_none();
        let selected: Vec<&str> = body
            .iter()
            .copied()
            .filter(|line| {
                if select_all {
                    return true;
                }
                let lower = line.to_lowercase();
                f.terms.iter().any(|t| lower.contains(t.as_str()))
                    || f.regex.as_ref().is_some_and(|re| re.is_match(line))
            })
            .collect();
        let bounded = match f.take {
            Some(Take::First(n)) => selected.into_iter().take(n).collect(),
            Some(Take::Last(n)) => truncate_tail(&selected, n).0,
            None => selected,
        };
        header
            .into_iter()
            .chain(bounded)
            .map(str::to_string)
            .collect()
    }
}

fn compile_filter(def: &IssueCheckDefinition, f: &LineFilter) -> Result<CompiledFilter> {
    if f.terms.iter().any(|t| t.is_empty()) {
        return Err(DigestError::config(label(def), "filter terms must not be empty"));
    }
    if let Some(Take::First(0) | Take::Last(0)) = f.take {
        return Err(DigestError::config(label(def), "filter take bound must be positive"));
    }
    let regex = match &f.regex {
        Some(p) => Some(build_regex(def, p)?),
        None => None,
    };
    Ok(CompiledFilter {
        terms: f.terms.iter().map(|t| t.to_lowercase()).collect(),
        regex,
        keep_header: f.keep_header,
        take: f.take,
    })
}

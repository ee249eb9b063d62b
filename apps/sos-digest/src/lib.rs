//! sos-digest core library.
//!
//! This crate exposes programmatic APIs for turning an unpacked sosreport
//! into topic-scoped Markdown documents and an issues investigation report.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `rules`: Rule index loading, overrides, and validation.
//! - `checks`: Compiled issue predicates and excerpt filters.
//! - `resolve`: Path and glob resolution under the sosreport root.
//! - `truncate`: Tail-biased line and word truncation.
//! - `collect`: Per-category collection with per-file line budgets.
//! - `scan`: Issue scanning over source files.
//! - `render`: Deterministic Markdown rendering.
//! - `digest`: Orchestration and atomic document writes.
//! - `sos`: Sosreport layout heuristics and host identity.
//! - `models`: Data models for the index, check policy, and results.
//! - `output`: Human/JSON printers for the CLI.
//! - `error`, `logging`, `utils`: Supporting pieces.
pub mod checks;
pub mod cli;
pub mod collect;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod render;
pub mod resolve;
pub mod rules;
pub mod scan;
pub mod sos;
pub mod truncate;
pub mod utils;

//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sos-digest",
    version,
    about = "Turn a sosreport into topic-scoped Markdown for AI assistants",
    long_about = "sos-digest reads an unpacked sosreport and writes a fixed set of Markdown documents: one per topic plus an issues investigation report.\n\nConfiguration precedence: CLI > sos-digest.toml > defaults.",
    after_help = "Examples:\n  sos-digest generate /tmp/sosreport-host-2024 ./out\n  sos-digest scan /tmp/sosreport-host-2024 --output json\n  sos-digest list --index my-index.toml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, short, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[arg(long, global = true, help = "Log filter (e.g. info, debug, sos_digest=trace)")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current sos-digest version.")]
    Version,
    /// Generate all documents
    #[command(
        about = "Generate the Markdown documents",
        long_about = "Collect every category into its own document and write the issues investigation report. Existing documents with the same names are overwritten.",
        after_help = "Examples:\n  sos-digest generate ./sosreport ./out\n  sos-digest generate ./sosreport ./out --yes --output json"
    )]
    Generate {
        #[arg(help = "Path to the unpacked sosreport directory")]
        sos_root: String,
        #[arg(help = "Directory for the generated .md files (created if missing)")]
        output_dir: String,
        #[arg(long, help = "Config file (default: ./sos-digest.toml|yaml)")]
        config: Option<String>,
        #[arg(long, help = "Rule index replacing the built-in one")]
        index: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Do not ask before writing into a non-empty directory")]
        yes: bool,
    },
    /// Run the issue checks only
    #[command(
        about = "Run issue checks",
        long_about = "Scan the sosreport for known problem signatures and print the findings without writing files.",
        after_help = "Examples:\n  sos-digest scan ./sosreport\n  sos-digest scan ./sosreport --output json"
    )]
    Scan {
        #[arg(help = "Path to the unpacked sosreport directory")]
        sos_root: String,
        #[arg(long, help = "Config file (default: ./sos-digest.toml|yaml)")]
        config: Option<String>,
        #[arg(long, help = "Rule index replacing the built-in one")]
        index: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List categories and checks
    #[command(
        about = "List rules",
        long_about = "Print the effective categories and issue checks after config overrides."
    )]
    List {
        #[arg(long, help = "Config file (default: ./sos-digest.toml|yaml)")]
        config: Option<String>,
        #[arg(long, help = "Rule index replacing the built-in one")]
        index: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

//! sos-digest CLI binary entry point.
//! Delegates to the library for collection, scanning, and rendering.

use clap::Parser;
use sos_digest::cli::{Cli, Commands};
use sos_digest::config::{self, Effective};
use sos_digest::digest::{self, DigestOptions};
use sos_digest::error::DigestError;
use sos_digest::rules::{self, RuleSet};
use sos_digest::utils::{error_prefix, info_prefix, note_prefix};
use sos_digest::{logging, output, sos};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn fail(e: &DigestError) -> ! {
    eprintln!("{} {}", error_prefix(), e);
    std::process::exit(e.exit_code());
}

fn cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve config and compile the rule set, exiting on configuration errors.
fn load(
    cli_config: Option<&str>,
    cli_index: Option<&str>,
    cli_output: Option<&str>,
) -> (Effective, RuleSet) {
    let eff = config::resolve_effective(&cwd(), cli_config, cli_index, cli_output)
        .unwrap_or_else(|e| fail(&e));
    if eff.output != "json" {
        match eff.config_path.as_ref() {
            Some(p) => eprintln!("{} Using config {}", info_prefix(), p.display()),
            None => eprintln!("{} No sos-digest.toml found; using defaults.", note_prefix()),
        }
    }
    let rules = rules::load_index(eff.index.as_deref())
        .and_then(|ix| rules::compile(ix, &eff.overrides))
        .unwrap_or_else(|e| fail(&e));
    (eff, rules)
}

/// Exit with code 2 unless `path` looks like an unpacked sosreport.
fn require_sosreport(path: &Path) -> PathBuf {
    if !path.is_dir() {
        eprintln!("{} sosreport directory not found: {}", error_prefix(), path.display());
        std::process::exit(2);
    }
    let info = sos::inspect(path);
    if !info.valid {
        eprintln!(
            "{} Directory does not appear to be a valid sosreport: {}",
            error_prefix(),
            path.display()
        );
        if info.indicators.is_empty() {
            eprintln!("  No sosreport indicators found (sos_commands, etc, proc, var, installed-rpms, ...)");
        } else {
            eprintln!("  Found only: {}", info.indicators.join(", "));
        }
        eprintln!("A valid sosreport contains 'sos_commands/' and directories like 'etc/', 'proc/', 'var/'.");
        std::process::exit(2);
    }
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn confirm(message: &str) -> bool {
    let stdin = io::stdin();
    loop {
        eprint!("{} [y/N]: ", message);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" | "" => return false,
            _ => eprintln!("Please enter 'y' or 'n'."),
        }
    }
}

/// Create or validate the output directory. Exits on refusal.
fn prepare_output(sos_root: &Path, out: &Path, assume_yes: bool) -> PathBuf {
    if !out.exists() {
        if let Err(e) = std::fs::create_dir_all(out) {
            eprintln!("{} cannot create {}: {}", error_prefix(), out.display(), e);
            std::process::exit(2);
        }
        eprintln!("{} Created output directory: {}", info_prefix(), out.display());
    } else if !out.is_dir() {
        eprintln!("{} Output path exists but is not a directory: {}", error_prefix(), out.display());
        std::process::exit(2);
    }
    let out = out.canonicalize().unwrap_or_else(|_| out.to_path_buf());
    if out == sos_root {
        eprintln!("{} Output directory cannot be the sosreport directory: {}", error_prefix(), out.display());
        std::process::exit(2);
    }
    let existing: Vec<String> = std::fs::read_dir(&out)
        .map(|rd| {
            rd.flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    if !existing.is_empty() && !assume_yes {
        eprintln!("Output directory is not empty: {}", out.display());
        for item in existing.iter().take(10) {
            eprintln!("    - {}", item);
        }
        if existing.len() > 10 {
            eprintln!("    ... and {} more items", existing.len() - 10);
        }
        if !confirm("Continue? (existing documents with the same names are overwritten)") {
            eprintln!("Aborted.");
            std::process::exit(0);
        }
    }
    out
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("{} logging setup failed: {}", note_prefix(), e);
    }
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Generate {
            sos_root,
            output_dir,
            config,
            index,
            output,
            yes,
        } => {
            // Rules are validated before touching the sosreport.
            let (eff, rules) = load(config.as_deref(), index.as_deref(), output.as_deref());
            let root = require_sosreport(Path::new(&sos_root));
            let out = prepare_output(&root, Path::new(&output_dir), yes);
            let opts = DigestOptions {
                max_words: eff.max_words,
                scan_max_lines: eff.scan_max_lines,
            };
            let report = digest::generate(&root, &out, &rules, &opts);
            output::print_generate(&report, &eff.output);
            if report.failures() > 0 {
                std::process::exit(1);
            }
        }
        Commands::Scan {
            sos_root,
            config,
            index,
            output,
        } => {
            let (eff, rules) = load(config.as_deref(), index.as_deref(), output.as_deref());
            let root = require_sosreport(Path::new(&sos_root));
            let opts = DigestOptions {
                max_words: eff.max_words,
                scan_max_lines: eff.scan_max_lines,
            };
            let report = digest::scan_only(&root, &rules, &opts);
            output::print_scan(&report, &eff.output);
        }
        Commands::List {
            config,
            index,
            output,
        } => {
            let (eff, rules) = load(config.as_deref(), index.as_deref(), output.as_deref());
            output::print_list(&rules, &eff.output);
        }
    }
}

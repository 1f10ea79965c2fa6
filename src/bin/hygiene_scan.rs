use std::path::{Path, PathBuf};

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use hygiene_hooks::analysis::{is_excluded, scan_text, ScanOptions, Violation};
use hygiene_hooks::config::{load_config, load_config_from, Config};
use hygiene_hooks::init_tracing;
use hygiene_hooks::messages::render_hygiene_block;

const EXIT_CLEAN: i32 = 0;
const EXIT_VIOLATIONS: i32 = 1;
const EXIT_IO_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "hygiene-scan")]
#[command(version, about = "Run the post-edit hygiene checks over source files")]
struct Cli {
    /// Files to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Config file (defaults to the agentkit config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum lines per file (overrides config)
    #[arg(long)]
    max_file_lines: Option<usize>,

    /// Maximum lines per function (overrides config)
    #[arg(long)]
    max_function_lines: Option<usize>,

    /// Duplicate block window size (overrides config)
    #[arg(long)]
    min_duplicate_lines: Option<usize>,

    /// Maximum exports per TS/JS file (overrides config)
    #[arg(long)]
    max_exports: Option<usize>,

    /// Path substrings to skip (can be given multiple times)
    #[arg(long, short = 'x')]
    exclude: Vec<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn effective_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path).map_err(|e| e.to_string())?,
        None => load_config(),
    };
    let t = &mut config.thresholds;
    if let Some(v) = cli.max_file_lines {
        t.max_file_lines = v;
    }
    if let Some(v) = cli.max_function_lines {
        t.max_function_lines = v;
    }
    if let Some(v) = cli.min_duplicate_lines {
        t.min_duplicate_lines = v;
    }
    if let Some(v) = cli.max_exports {
        t.max_exports_per_file = v;
    }
    t.exclude_patterns.extend(cli.exclude.iter().cloned());
    Ok(config)
}

fn scan_file(path: &Path, config: &Config) -> Option<FileResult> {
    let display = path.to_string_lossy().to_string();
    let options = ScanOptions::for_path(&display)?;
    if is_excluded(&display, &config.thresholds.exclude_patterns) {
        return None;
    }
    let result = match std::fs::read_to_string(path) {
        Ok(content) => FileResult {
            path: display,
            violations: scan_text(&content, &config.thresholds, options)
                .map(|r| r.violations)
                .unwrap_or_default(),
            error: None,
        },
        Err(e) => FileResult {
            path: display,
            violations: Vec::new(),
            error: Some(e.to_string()),
        },
    };
    Some(result)
}

fn print_text(results: &[FileResult], config: &Config) {
    for result in results {
        if let Some(err) = &result.error {
            eprintln!("{}: {}", result.path, err);
            continue;
        }
        if result.violations.is_empty() {
            continue;
        }
        let report = hygiene_hooks::HygieneReport {
            violations: result.violations.clone(),
        };
        println!("{}:{}", result.path, render_hygiene_block(&report, &config.thresholds));
        println!();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match effective_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hygiene-scan: {e}");
            std::process::exit(EXIT_IO_ERROR);
        }
    };

    let results: Vec<FileResult> = cli
        .paths
        .par_iter()
        .filter_map(|p| scan_file(p, &config))
        .collect();

    if cli.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("hygiene-scan: {e}");
                std::process::exit(EXIT_IO_ERROR);
            }
        }
    } else {
        print_text(&results, &config);
    }

    let exit_code = if results.iter().any(|r| r.error.is_some()) {
        EXIT_IO_ERROR
    } else if results.iter().any(|r| !r.violations.is_empty()) {
        EXIT_VIOLATIONS
    } else {
        EXIT_CLEAN
    };
    std::process::exit(exit_code);
}

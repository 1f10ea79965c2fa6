//! Text blocks appended to the PostToolUse additional context.

use std::fmt::Write;

use crate::analysis::dependencies::VersionFinding;
use crate::analysis::scanner::HygieneReport;
use crate::config::Thresholds;

const RULE_WIDTH: usize = 50;

/// Numbered violations followed by the standing instructions.
pub fn render_hygiene_block(report: &HygieneReport, thresholds: &Thresholds) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("\n\nCODING STANDARDS VIOLATION (coding-police)\n");
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    for (i, violation) in report.violations.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(out, "{}. {}", i + 1, violation);
    }
    out.push_str("\n\nREQUIRED ACTIONS:\n");
    out.push_str("- Keep code DRY: extract duplicated logic into shared functions.\n");
    let _ = writeln!(
        out,
        "- Keep files modular: split files exceeding {} lines by functionality.",
        thresholds.max_file_lines
    );
    let _ = writeln!(
        out,
        "- Keep functions focused: break functions over {} lines into composable helpers.",
        thresholds.max_function_lines
    );
    out.push_str("- Apply Single Responsibility: each file should have one clear purpose.\n");
    out.push_str("\nFix these violations before proceeding.");
    out
}

/// Empty when there are no findings.
pub fn render_dependency_block(findings: &[VersionFinding]) -> String {
    if findings.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n\nDEPENDENCY VERSION CHECK\n");
    for finding in findings {
        let _ = writeln!(out, "  {finding}");
    }
    out.push_str(
        "\nIf any dependency is OUTDATED, you MUST update it to the latest version before proceeding. \
         Do NOT use outdated versions from your training data.",
    );
    out
}

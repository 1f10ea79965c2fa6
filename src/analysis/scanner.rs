//! Runs every hygiene check over one file and merges the findings.

use serde::Serialize;

use super::boundary::check_function_lengths;
use super::duplicate_detector::check_duplicate_blocks;
use super::file_classifier::{classify_path, FileCategory};
use super::lines::{split_lines, Line};
use super::metrics::{check_export_count, check_file_length};
use super::violation::Violation;
use crate::config::Thresholds;

/// Per-file switches decided by the caller from the file's path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub count_exports: bool,
}

impl ScanOptions {
    /// Options for a path, or `None` when the path is not scanned at all.
    pub fn for_path(path: &str) -> Option<Self> {
        match classify_path(path) {
            FileCategory::SourceCode { exports_checked } => Some(Self {
                count_exports: exports_checked,
            }),
            _ => None,
        }
    }
}

/// Non-empty, ordered list of findings for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HygieneReport {
    pub violations: Vec<Violation>,
}

/// Scan already-split lines.
///
/// Findings are ordered file length, function lengths, duplicates, exports.
/// Returns `None` rather than an empty report when the file is clean.
pub fn scan_lines(
    lines: &[Line<'_>],
    thresholds: &Thresholds,
    options: ScanOptions,
) -> Option<HygieneReport> {
    // The two line-walking detectors are independent pure functions.
    let (functions, duplicates) = rayon::join(
        || check_function_lengths(lines, thresholds.max_function_lines),
        || check_duplicate_blocks(lines, thresholds.min_duplicate_lines),
    );

    let mut violations: Vec<Violation> = check_file_length(lines, thresholds.max_file_lines)
        .into_iter()
        .collect();
    violations.extend(functions);
    violations.extend(duplicates);
    if options.count_exports {
        violations.extend(check_export_count(lines, thresholds.max_exports_per_file));
    }

    tracing::debug!(lines = lines.len(), violations = violations.len(), "hygiene scan finished");
    (!violations.is_empty()).then_some(HygieneReport { violations })
}

pub fn scan_text(text: &str, thresholds: &Thresholds, options: ScanOptions) -> Option<HygieneReport> {
    scan_lines(&split_lines(text), thresholds, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::violation::ViolationKind;

    fn kinds(report: &HygieneReport) -> Vec<ViolationKind> {
        report.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn clean_file_has_no_report() {
        let text = "function ok() {\n  return 1;\n}\n";
        assert_eq!(scan_text(text, &Thresholds::default(), ScanOptions::default()), None);
    }

    #[test]
    fn findings_follow_fixed_order() {
        let thresholds = Thresholds {
            max_file_lines: 10,
            max_function_lines: 5,
            min_duplicate_lines: 3,
            max_exports_per_file: 1,
            exclude_patterns: Vec::new(),
        };
        let text = [
            "export function big() {",
            "  const a = 1;",
            "  const b = 2;",
            "  const c = 3;",
            "  const a = 1;",
            "  const b = 2;",
            "  const c = 3;",
            "}",
            "export const x = 1;",
            "export const y = 2;",
            "export const z = 3;",
        ]
        .join("\n");

        let report = scan_text(&text, &thresholds, ScanOptions { count_exports: true }).unwrap();
        assert_eq!(
            kinds(&report),
            vec![
                ViolationKind::FileTooLong,
                ViolationKind::LongFunction,
                ViolationKind::DuplicateCode,
                ViolationKind::TooManyExports,
            ]
        );

        let without_exports = scan_text(&text, &thresholds, ScanOptions::default()).unwrap();
        assert!(!kinds(&without_exports).contains(&ViolationKind::TooManyExports));
    }

    #[test]
    fn rescanning_is_stable() {
        let text = (0..1200).map(|i| format!("x{} = {}", i % 7, i % 7)).collect::<Vec<_>>().join("\n");
        let first = scan_text(&text, &Thresholds::default(), ScanOptions::default());
        let second = scan_text(&text, &Thresholds::default(), ScanOptions::default());
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn options_follow_path() {
        assert_eq!(ScanOptions::for_path("a/b.ts"), Some(ScanOptions { count_exports: true }));
        assert_eq!(ScanOptions::for_path("a/b.py"), Some(ScanOptions { count_exports: false }));
        assert_eq!(ScanOptions::for_path("a/b.d.ts"), None);
        assert_eq!(ScanOptions::for_path("README.md"), None);
    }
}

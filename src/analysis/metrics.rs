//! Whole-file metrics: line count and exported declaration count
use once_cell::sync::Lazy;
use regex::Regex;

use super::lines::Line;
use super::violation::Violation;

static EXPORT_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"^\s*export\s+(?:default\s+)?(?:function|class|const|let|var|type|interface|enum|async)",
    )
});

/// Flag the file when it has more than `max_lines` lines. Exactly at the
/// limit is fine.
pub fn check_file_length(lines: &[Line<'_>], max_lines: usize) -> Option<Violation> {
    (lines.len() > max_lines).then(|| Violation::file_too_long(lines.len(), max_lines))
}

/// Count lines that open an exported declaration.
///
/// The export keyword must be the first token on the line, so commented-out
/// exports never count.
pub fn count_exports(lines: &[Line<'_>]) -> usize {
    match EXPORT_RE.as_ref() {
        Ok(re) => lines.iter().filter(|l| re.is_match(l.text)).count(),
        Err(e) => {
            tracing::error!(error = %e, "invalid export pattern");
            0
        }
    }
}

pub fn check_export_count(lines: &[Line<'_>], max_exports: usize) -> Option<Violation> {
    let count = count_exports(lines);
    (count > max_exports).then(|| Violation::too_many_exports(count, max_exports))
}

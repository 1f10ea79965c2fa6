//! Heuristic function boundary scanner.
//!
//! A single left-to-right pass approximates function extents across the
//! C-like, script and indentation-significant language families without a
//! grammar. A span opens on the first line matching one of the signature
//! matchers and closes on whichever signal fires first:
//!
//! * brace balance: the running `{`/`}` depth is back at or below zero on a
//!   line (after the opening one) that contains a closing brace;
//! * dedent: a non-blank, non-comment line that does not start with a closing
//!   token sits at or left of the opening line's indentation, at least two
//!   lines after the opening one;
//! * end of input.
//!
//! Only one span is tracked at a time, so signatures nested inside an open
//! span are not measured separately. The line that closes a span is not
//! re-examined as a potential signature.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::lines::Line;
use super::violation::Violation;

/// Which signature style opened a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStyle {
    /// `function name(` with optional `export` / `async`
    FunctionKeyword,
    /// `const name = (` / `const name = async (`
    ArrowAssignment,
    /// bare `name(args) {` method signature, optionally with modifiers
    MethodSignature,
    /// Python `def name(`
    PythonDef,
    /// Go `func name(` or `func (recv) name(`
    GoFunc,
    /// Rust `fn name`
    RustFn,
}

struct SignatureMatcher {
    style: SignatureStyle,
    pattern: Regex,
}

// Order matters: the first matcher that hits wins.
static MATCHERS: Lazy<Vec<SignatureMatcher>> = Lazy::new(|| {
    [
        (
            SignatureStyle::FunctionKeyword,
            r"^\s*(?:export\s+)?(?:async\s+)?function\s+(\w+)",
        ),
        (
            SignatureStyle::ArrowAssignment,
            r"^\s*(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?\(",
        ),
        (
            SignatureStyle::MethodSignature,
            r"^\s*(?:public|private|protected|static|async|\s)*(\w+)\s*\([^)]*\)\s*(?::\s*\S+)?\s*\{",
        ),
        (SignatureStyle::PythonDef, r"^\s*(?:async\s+)?def\s+(\w+)\s*\("),
        (SignatureStyle::GoFunc, r"^\s*func\s+(?:\([^)]*\)\s+)?(\w+)\s*\("),
        (
            SignatureStyle::RustFn,
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+(\w+)",
        ),
    ]
    .into_iter()
    .filter_map(|(style, pat)| match Regex::new(pat) {
        Ok(pattern) => Some(SignatureMatcher { style, pattern }),
        Err(e) => {
            tracing::error!(?style, error = %e, "invalid signature pattern");
            None
        }
    })
    .collect()
});

/// A captured signature: the style that matched and the declared name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureMatch<'a> {
    pub style: SignatureStyle,
    pub name: &'a str,
}

/// Try every matcher in priority order against one line.
pub fn match_signature(text: &str) -> Option<SignatureMatch<'_>> {
    MATCHERS.iter().find_map(|m| {
        m.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|name| SignatureMatch {
                style: m.style,
                name: name.as_str(),
            })
    })
}

/// Detected start/end range of one function-like construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan<'a> {
    pub name: &'a str,
    pub style: SignatureStyle,
    pub start_line: usize,
    pub end_line: usize,
}

impl FunctionSpan<'_> {
    /// Inclusive line count, opening and closing lines included.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

struct OpenSpan<'a> {
    name: &'a str,
    style: SignatureStyle,
    start_line: usize,
    baseline: usize,
    depth: i64,
}

fn brace_delta(text: &str) -> i64 {
    text.chars().fold(0, |acc, ch| match ch {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

fn is_comment_line(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

fn starts_with_closing_token(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('}' | ')' | ']'))
}

impl<'a> OpenSpan<'a> {
    fn closes_on(&self, line: &Line<'_>) -> bool {
        let brace_close =
            self.depth <= 0 && line.number > self.start_line && line.text.contains('}');

        // The baseline is always known once a span is open, so the dedent
        // signal applies to brace languages too.
        let dedent_close = line.number > self.start_line + 1
            && !line.is_blank()
            && !is_comment_line(line.text)
            && line.indent() <= self.baseline
            && !starts_with_closing_token(line.text);

        brace_close || dedent_close
    }

    fn close(self, end_line: usize) -> FunctionSpan<'a> {
        FunctionSpan {
            name: self.name,
            style: self.style,
            start_line: self.start_line,
            end_line,
        }
    }
}

/// Find every function span in the file, in order of appearance.
pub fn scan_function_spans<'a>(lines: &[Line<'a>]) -> Vec<FunctionSpan<'a>> {
    let mut spans = Vec::new();
    let mut open: Option<OpenSpan<'a>> = None;
    let last_line = lines.last().map(|l| l.number).unwrap_or(0);

    for line in lines {
        if open.is_none() {
            open = match_signature(line.text).map(|sig| OpenSpan {
                name: sig.name,
                style: sig.style,
                start_line: line.number,
                baseline: line.indent(),
                depth: 0,
            });
        }

        let Some(span) = open.as_mut() else {
            continue;
        };
        span.depth += brace_delta(line.text);

        if span.closes_on(line) || line.number == last_line {
            if let Some(span) = open.take() {
                debug!(name = span.name, start = span.start_line, end = line.number, "function span closed");
                spans.push(span.close(line.number));
            }
        }
    }

    spans
}

/// Report every function span longer than `max_lines`.
pub fn check_function_lengths(lines: &[Line<'_>], max_lines: usize) -> Vec<Violation> {
    scan_function_spans(lines)
        .into_iter()
        .filter(|span| span.line_count() > max_lines)
        .map(|span| Violation::long_function(span.name, span.line_count(), max_lines, span.start_line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::lines::split_lines;
    use crate::analysis::violation::ViolationKind;

    fn body(count: usize, indent: &str, stmt: &str) -> Vec<String> {
        (0..count).map(|i| format!("{indent}{stmt}{i};")).collect()
    }

    fn source(head: &str, body: Vec<String>, tail: &[&str]) -> String {
        let mut all = vec![head.to_string()];
        all.extend(body);
        all.extend(tail.iter().map(|s| s.to_string()));
        all.join("\n")
    }

    #[test]
    fn matcher_priority_and_names() {
        let cases = [
            ("export async function loadAll() {", SignatureStyle::FunctionKeyword, "loadAll"),
            ("const handler = async (req, res) => {", SignatureStyle::ArrowAssignment, "handler"),
            ("  private render(props): Node {", SignatureStyle::MethodSignature, "render"),
            ("    async def fetch_rows(self):", SignatureStyle::PythonDef, "fetch_rows"),
            ("func (s *Server) Serve(l net.Listener) error {", SignatureStyle::GoFunc, "Serve"),
            ("pub(crate) async fn run() -> Result<()> {", SignatureStyle::RustFn, "run"),
        ];
        for (text, style, name) in cases {
            let m = match_signature(text).unwrap_or_else(|| panic!("no match for {text}"));
            assert_eq!(m.style, style, "{text}");
            assert_eq!(m.name, name, "{text}");
        }
        assert!(match_signature("let total = items.len();").is_none());
        assert!(match_signature("").is_none());
    }

    #[test]
    fn short_function_is_not_reported() {
        let text = "function shortFunc() {\n  const a = 1;\n  return a;\n}";
        let lines = split_lines(text);
        let spans = scan_function_spans(&lines);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start_line, spans[0].end_line), (1, 4));
        assert!(check_function_lengths(&lines, 100).is_empty());
    }

    #[test]
    fn brace_declaration_reports_name_length_and_start() {
        let text = source("function longFunc() {", body(120, "  ", "const x"), &["}"]);
        let lines = split_lines(&text);
        let violations = check_function_lengths(&lines, 100);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::LongFunction);
        assert!(violations[0].message.contains("`longFunc` is 122 lines"));
        assert!(violations[0].message.contains("starts at line 1"));
    }

    #[test]
    fn arrow_assignment_is_measured() {
        let text = source(
            "export const buildIndex = async (rows) => {",
            body(110, "  ", "await step"),
            &["};"],
        );
        let lines = split_lines(&text);
        let violations = check_function_lengths(&lines, 100);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("`buildIndex` is 112 lines"));
    }

    #[test]
    fn python_def_closes_on_dedent() {
        let mut text = source("def long_python_func():", body(110, "    ", "x = "), &[""]);
        text.push_str("\ndef next_func():\n    return 1");
        let lines = split_lines(&text);
        let spans = scan_function_spans(&lines);
        assert_eq!(spans[0].name, "long_python_func");
        // closed by the `def next_func` line at 113
        assert_eq!(spans[0].end_line, 113);
        let violations = check_function_lengths(&lines, 100);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("`long_python_func` is 113 lines"));
    }

    #[test]
    fn comment_and_closing_lines_do_not_dedent_close() {
        let text = "def f():\n    a = 1\n# note\n    b = 2\n\nx = 3";
        let lines = split_lines(text);
        let spans = scan_function_spans(&lines);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end_line, 6);
    }

    #[test]
    fn go_and_rust_signatures_are_measured() {
        let go = source("func longGoFunc() error {", body(110, "\t", "x := "), &["}"]);
        let rust = source("pub async fn long_rust_fn() -> Result<()> {", body(110, "    ", "let x"), &["}"]);
        for (text, name) in [(go, "longGoFunc"), (rust, "long_rust_fn")] {
            let lines = split_lines(&text);
            let violations = check_function_lengths(&lines, 100);
            assert_eq!(violations.len(), 1, "{name}");
            assert!(violations[0].message.contains(name));
        }
    }

    #[test]
    fn only_long_function_is_reported_among_neighbours() {
        let mut text = String::from("function short() {\n  return 1;\n}\n");
        text.push_str(&source("function long() {", body(110, "  ", "const x"), &["}"]));
        let lines = split_lines(&text);
        let violations = check_function_lengths(&lines, 100);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("`long`"));
        assert!(violations[0].message.contains("starts at line 4"));
    }

    #[test]
    fn nested_signatures_are_not_measured_separately() {
        let mut inner = vec!["  function inner() {".to_string()];
        inner.extend(body(5, "    ", "const y"));
        inner.push("  }".to_string());
        let text = source("function outer() {", inner, &["  return 1;", "}"]);
        let lines = split_lines(&text);
        let spans = scan_function_spans(&lines);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "outer");
        assert_eq!(spans[0].end_line, lines.len());
    }

    #[test]
    fn unbalanced_braces_force_close_at_end_of_input() {
        let text = source("function broken() {", body(20, "  ", "if (x) { y"), &[]);
        let lines = split_lines(&text);
        let spans = scan_function_spans(&lines);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end_line, 21);
        assert_eq!(check_function_lengths(&lines, 10).len(), 1);
    }

    #[test]
    fn zero_threshold_flags_every_function() {
        let lines = split_lines("function a() {\n}\nfunction b() {\n}");
        assert_eq!(check_function_lengths(&lines, 0).len(), 2);
    }
}

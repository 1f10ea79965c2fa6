use serde::Serialize;
use std::fmt;

/// Category of a hygiene finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    FileTooLong,
    LongFunction,
    DuplicateCode,
    TooManyExports,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::FileTooLong => "file_too_long",
            ViolationKind::LongFunction => "long_function",
            ViolationKind::DuplicateCode => "duplicate_code",
            ViolationKind::TooManyExports => "too_many_exports",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding with its fully rendered message.
///
/// Messages carry the concrete counts, limits and line numbers; downstream
/// consumers match on them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn file_too_long(count: usize, limit: usize) -> Self {
        let excess = count.saturating_sub(limit);
        Self {
            kind: ViolationKind::FileTooLong,
            message: format!(
                "FILE TOO LONG: {count} lines (limit: {limit}, over by {excess}).\n  \
                 Split this file into smaller modules grouped by functionality.\n  \
                 Identify logical boundaries (types, helpers, handlers, constants) and extract them."
            ),
        }
    }

    pub fn long_function(name: &str, length: usize, limit: usize, start_line: usize) -> Self {
        Self {
            kind: ViolationKind::LongFunction,
            message: format!(
                "LONG FUNCTION: `{name}` is {length} lines (limit: {limit}, starts at line {start_line}). \
                 Break it into smaller helper functions."
            ),
        }
    }

    pub fn duplicate_code(block_size: usize, first_line: usize, second_line: usize) -> Self {
        Self {
            kind: ViolationKind::DuplicateCode,
            message: format!(
                "DUPLICATE CODE: {block_size}+ line block duplicated at lines {first_line} and {second_line}. \
                 Extract into a shared function to keep code DRY."
            ),
        }
    }

    pub fn too_many_exports(count: usize, limit: usize) -> Self {
        Self {
            kind: ViolationKind::TooManyExports,
            message: format!(
                "TOO MANY EXPORTS: {count} exports in this file (limit: {limit}).\n  \
                 This suggests the file has multiple responsibilities.\n  \
                 Group related exports into separate modules (e.g., types.ts, helpers.ts, constants.ts)."
            ),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

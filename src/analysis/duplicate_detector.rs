//! Duplicate block detection over normalized lines.
//!
//! Lines are trimmed and noise (blank lines, comments, imports, lone
//! punctuation) is dropped before a fixed-size window slides across what is
//! left. Windows are compared verbatim, so this is an exact-match detector:
//! a whitespace change inside a line or a reordering defeats it.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use super::lines::Line;
use super::violation::Violation;

/// A trimmed, meaningful line that keeps its original position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedLine<'a> {
    pub text: &'a str,
    pub number: usize,
}

/// One reported repeat: where the block was first seen and where it recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateMatch {
    pub first_line: usize,
    pub second_line: usize,
    pub block_size: usize,
}

const IMPORT_PREFIXES: &[&str] = &["import", "from", "require", "use ", "using "];
const COMMENT_PREFIXES: &[&str] = &["//", "#", "*", "/*", "*/"];

fn is_punctuation_only(trimmed: &str) -> bool {
    trimmed
        .chars()
        .all(|c| matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ','))
}

fn is_noise(trimmed: &str) -> bool {
    trimmed.is_empty()
        || COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        || IMPORT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        || is_punctuation_only(trimmed)
}

/// Trim every line and keep only the ones worth comparing.
pub fn normalize_lines<'a>(lines: &[Line<'a>]) -> Vec<NormalizedLine<'a>> {
    lines
        .iter()
        .filter_map(|line| {
            let trimmed = line.text.trim();
            (!is_noise(trimmed)).then_some(NormalizedLine {
                text: trimmed,
                number: line.number,
            })
        })
        .collect()
}

/// Find repeated blocks of at least `min_lines` normalized lines.
///
/// Every recurrence is linked back to the first occurrence of the block only.
/// A window that merely extends the previous match by one line on both sides
/// belongs to that match, so a long copied region or uniform filler is
/// reported once, while every new occurrence site still gets its own match.
pub fn find_duplicate_blocks(lines: &[Line<'_>], min_lines: usize) -> Vec<DuplicateMatch> {
    let normalized = normalize_lines(lines);
    // A zero-sized window would match everything; treat it as the smallest block.
    let window = min_lines.max(1);
    if normalized.len() < window {
        return Vec::new();
    }

    let texts: Vec<&str> = normalized.iter().map(|l| l.text).collect();
    let mut first_seen: HashMap<&[&str], usize> = HashMap::new();
    let mut reported: HashSet<(usize, usize)> = HashSet::new();
    let mut matches = Vec::new();
    // (first, idx) of the previous duplicated window
    let mut previous: Option<(usize, usize)> = None;

    for (idx, block) in texts.windows(window).enumerate() {
        let first = match first_seen.entry(block) {
            Entry::Vacant(slot) => {
                slot.insert(idx);
                previous = None;
                continue;
            }
            Entry::Occupied(slot) => *slot.get(),
        };

        let extends_previous = previous.is_some_and(|(prev_first, prev_idx)| {
            idx == prev_idx + 1 && (first == prev_first + 1 || first == prev_first)
        });
        previous = Some((first, idx));
        if extends_previous {
            continue;
        }

        let pair = (normalized[first].number, normalized[idx].number);
        if reported.insert(pair) {
            matches.push(DuplicateMatch {
                first_line: pair.0,
                second_line: pair.1,
                block_size: window,
            });
        }
    }

    matches
}

/// Report duplicated blocks as violations, in order of the repeat site.
pub fn check_duplicate_blocks(lines: &[Line<'_>], min_lines: usize) -> Vec<Violation> {
    find_duplicate_blocks(lines, min_lines)
        .into_iter()
        .map(|m| Violation::duplicate_code(m.block_size, m.first_line, m.second_line))
        .collect()
}

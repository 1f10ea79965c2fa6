//! Line model shared by every detector

/// One raw line of a file together with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Width of the leading whitespace, in characters.
    pub fn indent(&self) -> usize {
        self.text.chars().take_while(|c| c.is_whitespace()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split file text into lines.
///
/// Splits on `\n` only, so a trailing newline yields a final empty line and
/// `\r` stays attached to the text (every consumer trims before comparing).
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(idx, text)| Line { text, number: idx + 1 })
        .collect()
}

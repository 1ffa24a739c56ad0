//! Grouping of aligned segments into context-windowed hunks.
//!
//! Changed lines are collected into hunks surrounded by at most `context`
//! unchanged lines on each side. A run of unchanged lines longer than twice
//! the context splits the current hunk from the next one; shorter runs stay
//! inside the hunk as context.

use serde::{Deserialize, Serialize};

use crate::lcs::{DiffSegment, Side};

/// Marker for lines removed from the left side (U+2212 MINUS SIGN).
pub const MINUS_MARKER: char = '\u{2212}';
/// Marker for lines added on the right side.
pub const PLUS_MARKER: char = '+';
/// Marker for unchanged context lines (U+2007 FIGURE SPACE, same width as a digit).
pub const CONTEXT_MARKER: char = '\u{2007}';
/// Appended to lines ending in a space so the whitespace stays visible.
/// Lines already ending in this marker get one more, so parsing stays
/// unambiguous.
pub const TRAILING_SPACE_MARKER: char = '\u{00AC}';

/// Kind of a formatted hunk line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Removed,
    Added,
    Context,
}

impl LineKind {
    pub fn marker(&self) -> char {
        match self {
            Self::Removed => MINUS_MARKER,
            Self::Added => PLUS_MARKER,
            Self::Context => CONTEXT_MARKER,
        }
    }

    fn from_marker(marker: char) -> Option<Self> {
        match marker {
            MINUS_MARKER => Some(Self::Removed),
            PLUS_MARKER => Some(Self::Added),
            CONTEXT_MARKER => Some(Self::Context),
            _ => None,
        }
    }
}

/// Prefix `content` with the marker for `kind`, making trailing spaces visible.
pub fn format_line(kind: LineKind, content: &str) -> String {
    let mut line = String::with_capacity(content.len() + 4);
    line.push(kind.marker());
    line.push_str(content);
    if content.ends_with(' ') || content.ends_with(TRAILING_SPACE_MARKER) {
        line.push(TRAILING_SPACE_MARKER);
    }
    line
}

/// Split a formatted line back into its kind and raw content.
///
/// Returns `None` if the line does not start with a known marker.
pub fn parse_line(line: &str) -> Option<(LineKind, String)> {
    let mut chars = line.chars();
    let kind = LineKind::from_marker(chars.next()?)?;
    let body = chars.as_str();
    let content = body.strip_suffix(TRAILING_SPACE_MARKER).unwrap_or(body);
    Some((kind, content.to_string()))
}

/// A contiguous block of a unified diff report.
///
/// Starts are 0-based positions in the left and right sequences; the
/// lengths count the lines attributable to each side (context lines count
/// toward both).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub left_start: usize,
    pub left_len: usize,
    pub right_start: usize,
    pub right_len: usize,
    pub lines: Vec<String>,
}

impl Hunk {
    /// Unified-diff position header, 1-based: `@@ −3,4 +3,5 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ {MINUS_MARKER}{},{} {PLUS_MARKER}{},{} @@",
            self.left_start + 1,
            self.left_len,
            self.right_start + 1,
            self.right_len
        )
    }

    /// Returns `true` if at least one line is a removal or an addition.
    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.starts_with(MINUS_MARKER) || l.starts_with(PLUS_MARKER))
    }

    fn push_lines<T: AsRef<str>>(&mut self, kind: LineKind, items: &[T]) {
        self.lines
            .extend(items.iter().map(|item| format_line(kind, item.as_ref())));
        match kind {
            LineKind::Removed => self.left_len += items.len(),
            LineKind::Added => self.right_len += items.len(),
            LineKind::Context => {
                self.left_len += items.len();
                self.right_len += items.len();
            }
        }
    }
}

/// Group aligned segments into hunks with `context` unchanged lines around
/// each change.
///
/// Only hunks containing at least one removed or added line are returned,
/// so identical inputs produce no hunks.
pub fn chunk<T: AsRef<str>>(segments: &[DiffSegment<T>], context: usize) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current = Hunk::default();

    for segment in segments {
        let items = segment.elements.as_slice();
        let len = items.len();
        match segment.side {
            Side::Both if len > context.saturating_mul(2) => {
                // Long unchanged run: close the current hunk after `context`
                // lines and open the next one `context` lines before the end.
                let mut next = Hunk {
                    left_start: current.left_start + current.left_len + len - context,
                    right_start: current.right_start + current.right_len + len - context,
                    ..Hunk::default()
                };
                next.push_lines(LineKind::Context, &items[len - context..]);
                current.push_lines(LineKind::Context, &items[..context]);
                let finished = std::mem::replace(&mut current, next);
                if finished.has_changes() {
                    hunks.push(finished);
                }
            }
            Side::Both if current.lines.is_empty() => {
                // Leading context: keep only the tail of the run.
                let skip = len.saturating_sub(context);
                current.left_start += skip;
                current.right_start += skip;
                current.push_lines(LineKind::Context, &items[skip..]);
            }
            Side::Both => current.push_lines(LineKind::Context, items),
            Side::OnlyLeft => current.push_lines(LineKind::Removed, items),
            Side::OnlyRight => current.push_lines(LineKind::Added, items),
        }
    }

    if current.has_changes() {
        hunks.push(current);
    }
    hunks
}

/// Render hunks as a patch: each header followed by its lines, joined by `\n`.
pub fn render_patch(hunks: &[Hunk]) -> String {
    hunks
        .iter()
        .flat_map(|h| std::iter::once(h.header()).chain(h.lines.iter().cloned()))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Line-level text diff: split, align, and chunk two strings.

use serde::{Deserialize, Serialize};

use crate::hunk::{chunk, render_patch, Hunk, MINUS_MARKER, PLUS_MARKER};
use crate::lcs::diff;

/// The result of diffing two texts line by line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// The diff hunks.
    pub hunks: Vec<Hunk>,
    /// Number of lines in the old text.
    pub old_lines: usize,
    /// Number of lines in the new text.
    pub new_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.count_prefixed(PLUS_MARKER)
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.count_prefixed(MINUS_MARKER)
    }

    /// The hunks rendered as a patch (see [`render_patch`]).
    pub fn render(&self) -> String {
        render_patch(&self.hunks)
    }

    fn count_prefixed(&self, marker: char) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.starts_with(marker))
            .count()
    }
}

/// Compute a line diff between two texts with `context` lines around each hunk.
///
/// Lines are split on `\n` keeping empty segments, so a missing or extra
/// trailing newline shows up as a changed (empty) last line.
pub fn diff_lines(old: &str, new: &str, context: usize) -> LineDiff {
    let old_split: Vec<&str> = old.split('\n').collect();
    let new_split: Vec<&str> = new.split('\n').collect();

    let hunks = if old == new {
        Vec::new()
    } else {
        chunk(&diff(&old_split, &new_split), context)
    };

    LineDiff {
        hunks,
        old_lines: old_split.len(),
        new_lines: new_split.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_no_diff() {
        let diff = diff_lines("hello\nworld\n", "hello\nworld\n", 4);
        assert!(diff.is_empty());
        assert_eq!(diff.additions(), 0);
        assert_eq!(diff.deletions(), 0);
        assert_eq!(diff.render(), "");
    }

    #[test]
    fn single_line_addition() {
        let diff = diff_lines("line1\nline2", "line1\nline2\nline3", 4);
        assert!(!diff.is_empty());
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 0);
    }

    #[test]
    fn single_line_deletion() {
        let diff = diff_lines("line1\nline2\nline3", "line1\nline3", 4);
        assert_eq!(diff.deletions(), 1);
        assert_eq!(diff.additions(), 0);
    }

    #[test]
    fn modification_shows_remove_and_add() {
        let diff = diff_lines("hello world", "hello universe", 4);
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 1);
    }

    #[test]
    fn trailing_newline_difference_is_reported() {
        let diff = diff_lines("a\nb", "a\nb\n", 4);
        assert!(!diff.is_empty());
        assert_eq!(diff.old_lines, 2);
        assert_eq!(diff.new_lines, 3);
        assert_eq!(diff.additions(), 1);
    }

    #[test]
    fn empty_to_content() {
        let diff = diff_lines("", "new content", 4);
        // "" splits to one empty line, which is replaced.
        assert_eq!(diff.deletions(), 1);
        assert_eq!(diff.additions(), 1);
    }

    #[test]
    fn render_matches_unified_layout() {
        let diff = diff_lines("a\nb\nc", "a\nx\nc", 1);
        assert_eq!(
            diff.render(),
            "@@ \u{2212}1,3 +1,3 @@\n\u{2007}a\n\u{2212}b\n+x\n\u{2007}c"
        );
    }
}

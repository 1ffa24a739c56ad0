//! Diff engine for Snapline.
//!
//! Aligns two sequences by repeatedly splitting around their longest common
//! run, then groups the aligned segments into context-windowed hunks that
//! render as a unified-diff-style patch.
//!
//! # Key Types
//!
//! - [`diff`] / [`DiffSegment`] / [`Side`] -- Sequence alignment
//! - [`chunk`] / [`Hunk`] -- Hunk grouping with context windows
//! - [`LineDiff`] / [`diff_lines`] -- Line-level text diff with summary counts

pub mod hunk;
pub mod lcs;
pub mod line_diff;

pub use hunk::{
    chunk, format_line, parse_line, render_patch, Hunk, LineKind, CONTEXT_MARKER, MINUS_MARKER,
    PLUS_MARKER, TRAILING_SPACE_MARKER,
};
pub use lcs::{diff, left_projection, right_projection, DiffSegment, Side};
pub use line_diff::{diff_lines, LineDiff};

//! Sequence alignment by longest common run.
//!
//! Every element of the left sequence is indexed by value once. For each
//! pending range pair, the right range is scanned while a sparse row of
//! "run length ending at left position i" values is carried forward, which
//! finds the longest common contiguous run in O(N·M) worst case and close to
//! linear time on text with few repeated lines. The ranges are then split
//! around that run and both halves go back on an explicit work stack, so
//! input size never bounds the call depth.
//!
//! A sub-range never holds a run longer than the one its parent was split
//! around, so a scan stops as soon as it finds a run of that length.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Which sequence(s) a segment's elements belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Present only in the left (old) sequence.
    OnlyLeft,
    /// Present only in the right (new) sequence.
    OnlyRight,
    /// Present in both sequences.
    Both,
}

impl Side {
    /// Returns `true` if the elements appear in the left sequence.
    pub fn in_left(&self) -> bool {
        matches!(self, Self::OnlyLeft | Self::Both)
    }

    /// Returns `true` if the elements appear in the right sequence.
    pub fn in_right(&self) -> bool {
        matches!(self, Self::OnlyRight | Self::Both)
    }
}

/// A non-empty run of elements tagged with the side(s) they come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment<T> {
    pub side: Side,
    pub elements: Vec<T>,
}

impl<T> DiffSegment<T> {
    pub fn new(side: Side, elements: Vec<T>) -> Self {
        Self { side, elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Position and length of a common run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Run {
    left: usize,
    right: usize,
    len: usize,
}

/// Align `left` against `right`.
///
/// Concatenating the left-visible segments reproduces `left` exactly, and
/// the right-visible segments reproduce `right`. No segment is empty. When
/// the two sides share nothing, the `OnlyLeft` segment precedes the
/// `OnlyRight` one.
pub fn diff<T>(left: &[T], right: &[T]) -> Vec<DiffSegment<T>>
where
    T: Eq + Hash + Clone,
{
    let index = PositionIndex::new(left);
    let mut segments = Vec::new();
    let mut work = vec![Work::Align {
        left: 0..left.len(),
        right: 0..right.len(),
        bound: left.len().min(right.len()),
    }];

    // Popped in order: prefix, common run, suffix.
    while let Some(item) = work.pop() {
        match item {
            Work::Common(range) => {
                segments.push(DiffSegment::new(Side::Both, left[range].to_vec()));
            }
            Work::Align {
                left: left_range,
                right: right_range,
                bound,
            } => match index.longest_common_run(right, &left_range, &right_range, bound) {
                None => {
                    if !left_range.is_empty() {
                        segments.push(DiffSegment::new(Side::OnlyLeft, left[left_range].to_vec()));
                    }
                    if !right_range.is_empty() {
                        segments.push(DiffSegment::new(
                            Side::OnlyRight,
                            right[right_range].to_vec(),
                        ));
                    }
                }
                Some(run) => {
                    let left_end = run.left + run.len;
                    let right_end = run.right + run.len;
                    work.push(Work::Align {
                        left: left_end..left_range.end,
                        right: right_end..right_range.end,
                        bound: run.len,
                    });
                    work.push(Work::Common(run.left..left_end));
                    work.push(Work::Align {
                        left: left_range.start..run.left,
                        right: right_range.start..run.right,
                        bound: run.len,
                    });
                }
            },
        }
    }
    segments
}

/// Pending step of [`diff`].
enum Work {
    /// Align two ranges; no common run in them is longer than `bound`.
    Align {
        left: Range<usize>,
        right: Range<usize>,
        bound: usize,
    },
    /// Emit a common run, given by its left range.
    Common(Range<usize>),
}

/// Positions of every left element, ascending per value.
struct PositionIndex<'a, T> {
    positions: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> PositionIndex<'a, T> {
    fn new(left: &'a [T]) -> Self {
        let mut positions: HashMap<&T, Vec<usize>> = HashMap::new();
        for (i, element) in left.iter().enumerate() {
            positions.entry(element).or_default().push(i);
        }
        Self { positions }
    }

    /// Left positions holding `element` that fall inside `range`.
    fn within(&self, element: &T, range: &Range<usize>) -> &[usize] {
        match self.positions.get(element) {
            Some(all) => {
                let start = all.partition_point(|&i| i < range.start);
                let end = all.partition_point(|&i| i < range.end);
                &all[start..end]
            }
            None => &[],
        }
    }

    /// Find the longest contiguous run shared by the two ranges.
    ///
    /// Ties go to the first run found scanning `right_range` from the front.
    fn longest_common_run(
        &self,
        right: &[T],
        left_range: &Range<usize>,
        right_range: &Range<usize>,
        bound: usize,
    ) -> Option<Run> {
        let bound = bound.min(left_range.len()).min(right_range.len());
        if bound == 0 {
            return None;
        }

        let mut best = Run::default();
        // (left position, run length) for runs ending at the previous right
        // element, ascending by position.
        let mut previous: Vec<(usize, usize)> = Vec::new();
        let mut current: Vec<(usize, usize)> = Vec::new();
        for j in right_range.clone() {
            current.clear();
            for &i in self.within(&right[j], left_range) {
                let extended = i
                    .checked_sub(1)
                    .and_then(|p| previous.binary_search_by_key(&p, |&(pos, _)| pos).ok())
                    .map_or(0, |k| previous[k].1);
                let len = extended + 1;
                current.push((i, len));
                if len > best.len {
                    best = Run {
                        left: i + 1 - len,
                        right: j + 1 - len,
                        len,
                    };
                    if len == bound {
                        return Some(best);
                    }
                }
            }
            std::mem::swap(&mut previous, &mut current);
        }

        (best.len > 0).then_some(best)
    }
}

/// Elements visible from the left sequence, in order.
pub fn left_projection<T: Clone>(segments: &[DiffSegment<T>]) -> Vec<T> {
    segments
        .iter()
        .filter(|s| s.side.in_left())
        .flat_map(|s| s.elements.iter().cloned())
        .collect()
}

/// Elements visible from the right sequence, in order.
pub fn right_projection<T: Clone>(segments: &[DiffSegment<T>]) -> Vec<T> {
    segments
        .iter()
        .filter(|s| s.side.in_right())
        .flat_map(|s| s.elements.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seg(side: Side, items: &[&'static str]) -> DiffSegment<&'static str> {
        DiffSegment::new(side, items.to_vec())
    }

    #[test]
    fn replaced_middle_line() {
        let segments = diff(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            segments,
            vec![
                seg(Side::Both, &["a"]),
                seg(Side::OnlyLeft, &["b"]),
                seg(Side::OnlyRight, &["x"]),
                seg(Side::Both, &["c"]),
            ]
        );
    }

    #[test]
    fn identical_sequences_are_one_segment() {
        let items = ["x", "y", "z"];
        assert_eq!(diff(&items, &items), vec![seg(Side::Both, &items)]);
    }

    #[test]
    fn both_empty_yields_nothing() {
        let empty: [&str; 0] = [];
        assert!(diff(&empty, &empty).is_empty());
    }

    #[test]
    fn one_side_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(diff(&["a", "b"], &empty), vec![seg(Side::OnlyLeft, &["a", "b"])]);
        assert_eq!(diff(&empty, &["a"]), vec![seg(Side::OnlyRight, &["a"])]);
    }

    #[test]
    fn disjoint_sequences_left_first() {
        assert_eq!(
            diff(&["a", "b"], &["c"]),
            vec![seg(Side::OnlyLeft, &["a", "b"]), seg(Side::OnlyRight, &["c"])]
        );
    }

    #[test]
    fn longest_run_wins_over_earlier_short_run() {
        // "a" matches early, but "c d e" is the longer common run.
        let segments = diff(&["c", "d", "e", "a"], &["a", "c", "d", "e"]);
        assert_eq!(
            segments,
            vec![
                seg(Side::OnlyRight, &["a"]),
                seg(Side::Both, &["c", "d", "e"]),
                seg(Side::OnlyLeft, &["a"]),
            ]
        );
    }

    #[test]
    fn ties_go_to_first_found_run() {
        let segments = diff(&["a", "b"], &["b", "a"]);
        // Scanning the right side, "b" is matched first.
        assert_eq!(
            segments,
            vec![
                seg(Side::OnlyLeft, &["a"]),
                seg(Side::Both, &["b"]),
                seg(Side::OnlyRight, &["a"]),
            ]
        );
    }

    #[test]
    fn duplicate_lines_are_aligned() {
        let left = ["}", "}", "x", "}"];
        let right = ["}", "x", "}", "}"];
        let segments = diff(&left, &right);
        assert_eq!(left_projection(&segments), left.to_vec());
        assert_eq!(right_projection(&segments), right.to_vec());
    }

    #[test]
    fn works_for_non_string_elements() {
        let segments = diff(&[1u32, 2, 3, 4], &[1u32, 3, 4, 5]);
        assert_eq!(left_projection(&segments), vec![1, 2, 3, 4]);
        assert_eq!(right_projection(&segments), vec![1, 3, 4, 5]);
        assert!(segments.iter().all(|s| !s.is_empty()));
    }

    fn alternating(n: usize, changed: &str) -> Vec<String> {
        (0..n)
            .map(|i| if i % 2 == 0 { format!("keep{i}") } else { changed.to_string() })
            .collect()
    }

    #[test]
    fn every_other_line_changed_in_a_large_input() {
        let n = 50_000;
        let left = alternating(n, "old");
        let right = alternating(n, "new");

        let segments = diff(&left, &right);
        assert_eq!(segments.len(), 3 * n / 2);
        assert_eq!(segments[0], DiffSegment::new(Side::Both, vec!["keep0".to_string()]));
        assert_eq!(segments[1], DiffSegment::new(Side::OnlyLeft, vec!["old".to_string()]));
        assert_eq!(segments[2], DiffSegment::new(Side::OnlyRight, vec!["new".to_string()]));
        assert_eq!(left_projection(&segments), left);
        assert_eq!(right_projection(&segments), right);
    }

    #[test]
    fn many_nested_prefix_splits() {
        // Common runs grow in length, so the longest one is always last and
        // every split leaves the remaining work in the prefix.
        let runs = 200u32;
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut expected = Vec::new();
        for r in 1..=runs {
            let common: Vec<u32> = (0..r).map(|t| r * 10_000 + t).collect();
            left.extend(&common);
            right.extend(&common);
            left.push(1_000_000_000 + r);
            right.push(2_000_000_000 + r);
            expected.push(DiffSegment::new(Side::Both, common));
            expected.push(DiffSegment::new(Side::OnlyLeft, vec![1_000_000_000 + r]));
            expected.push(DiffSegment::new(Side::OnlyRight, vec![2_000_000_000 + r]));
        }

        assert_eq!(diff(&left, &right), expected);
    }

    /// Split around the longest run by exhaustive search, ties to the
    /// earliest end in `right`, then the earliest start in `left`.
    fn exhaustive(left: &[u8], right: &[u8], out: &mut Vec<DiffSegment<u8>>) {
        let mut best = (0, 0, 0);
        for j in 0..right.len() {
            for i in 0..left.len() {
                let mut len = 0;
                while len <= i && len <= j && left[i - len] == right[j - len] {
                    len += 1;
                }
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        let (l, r, len) = best;
        if len == 0 {
            if !left.is_empty() {
                out.push(DiffSegment::new(Side::OnlyLeft, left.to_vec()));
            }
            if !right.is_empty() {
                out.push(DiffSegment::new(Side::OnlyRight, right.to_vec()));
            }
            return;
        }
        exhaustive(&left[..l], &right[..r], out);
        out.push(DiffSegment::new(Side::Both, left[l..l + len].to_vec()));
        exhaustive(&left[l + len..], &right[r + len..], out);
    }

    proptest! {
        #[test]
        fn agrees_with_exhaustive_search(
            left in prop::collection::vec(0u8..4, 0..24),
            right in prop::collection::vec(0u8..4, 0..24),
        ) {
            let mut expected = Vec::new();
            exhaustive(&left, &right, &mut expected);
            prop_assert_eq!(diff(&left, &right), expected);
        }

        #[test]
        fn projections_reconstruct_inputs(
            left in prop::collection::vec(0u8..6, 0..40),
            right in prop::collection::vec(0u8..6, 0..40),
        ) {
            let segments = diff(&left, &right);
            prop_assert_eq!(left_projection(&segments), left);
            prop_assert_eq!(right_projection(&segments), right);
            prop_assert!(segments.iter().all(|s| !s.is_empty()));
        }

        #[test]
        fn diff_with_itself_is_single_both(items in prop::collection::vec(0u8..6, 1..40)) {
            let segments = diff(&items, &items);
            prop_assert_eq!(segments, vec![DiffSegment::new(Side::Both, items)]);
        }
    }
}

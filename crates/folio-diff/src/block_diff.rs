//! Block-level alignment of two markup documents.
//!
//! The alignment is a longest common subsequence over normalized blocks.
//! Ties resolve leftmost-greedy: an equal pair is matched as soon as it is
//! seen, so insertions and deletions drift as late as possible. Within one
//! run of changes every removed block comes before every added block.

use std::collections::HashSet;

use serde::Serialize;

use crate::block::{extract_blocks, Block};
use crate::data::Side;

/// How a segment relates the two documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Unchanged,
    Added,
    Removed,
}

/// Presentation attributes for a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RenderHint {
    pub editable: bool,
    pub struck: bool,
    pub highlighted: bool,
}

impl SegmentKind {
    /// Removed blocks are shown struck and read-only, added blocks
    /// highlighted and editable, unchanged blocks plain and editable.
    pub fn render_hint(self) -> RenderHint {
        match self {
            Self::Unchanged => RenderHint {
                editable: true,
                struck: false,
                highlighted: false,
            },
            Self::Added => RenderHint {
                editable: true,
                struck: false,
                highlighted: true,
            },
            Self::Removed => RenderHint {
                editable: false,
                struck: true,
                highlighted: false,
            },
        }
    }

    fn on_side(self, side: Side) -> bool {
        match (self, side) {
            (Self::Unchanged, _) => true,
            (Self::Removed, Side::Current) | (Self::Added, Side::Proposed) => true,
            _ => false,
        }
    }
}

/// One aligned unit of a [`BlockDiff`].
///
/// An unchanged segment shows the proposed block. When the current block's
/// markup differs only in ways normalization ignores, it is kept in
/// `previous` so the current document can be rebuilt exactly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    pub block: Block,
    #[serde(skip)]
    previous: Option<Block>,
}

impl DiffSegment {
    fn new(kind: SegmentKind, block: Block) -> Self {
        Self {
            kind,
            block,
            previous: None,
        }
    }

    fn unchanged(current: Block, proposed: Block) -> Self {
        let previous = (current.html() != proposed.html()).then_some(current);
        Self {
            kind: SegmentKind::Unchanged,
            block: proposed,
            previous,
        }
    }

    /// The block as it appears in `side`.
    pub fn block_for(&self, side: Side) -> &Block {
        match (side, &self.previous) {
            (Side::Current, Some(previous)) => previous,
            _ => &self.block,
        }
    }

    pub fn render_hint(&self) -> RenderHint {
        self.kind.render_hint()
    }
}

/// Segment counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

/// Ordered alignment of a current and a proposed document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockDiff {
    pub segments: Vec<DiffSegment>,
}

impl BlockDiff {
    pub fn has_changes(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.kind != SegmentKind::Unchanged)
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Unchanged => stats.unchanged += 1,
                SegmentKind::Added => stats.added += 1,
                SegmentKind::Removed => stats.removed += 1,
            }
        }
        stats
    }

    /// The block sequence of one side: dropping added segments yields the
    /// current document, dropping removed segments the proposed one.
    pub fn side(&self, side: Side) -> Vec<&Block> {
        self.segments
            .iter()
            .filter(|s| s.kind.on_side(side))
            .map(|s| s.block_for(side))
            .collect()
    }

    /// Markup of one side, blocks separated by newlines.
    pub fn to_markup(&self, side: Side) -> String {
        self.side(side)
            .iter()
            .map(|b| b.html())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Align two block sequences.
pub fn diff_blocks(current: &[Block], proposed: &[Block]) -> BlockDiff {
    let mut segments = Vec::with_capacity(current.len().max(proposed.len()));

    // A shared prefix is always matched by the leftmost-greedy walk, so it
    // needs no table.
    let prefix = current
        .iter()
        .zip(proposed)
        .take_while(|(a, b)| a == b)
        .count();
    for (a, b) in current[..prefix].iter().zip(&proposed[..prefix]) {
        segments.push(DiffSegment::unchanged(a.clone(), b.clone()));
    }

    let suffix = matched_suffix(&current[prefix..], &proposed[prefix..]);

    let a = &current[prefix..current.len() - suffix];
    let b = &proposed[prefix..proposed.len() - suffix];
    let table = lcs_table(a, b);

    let (mut i, mut j) = (0, 0);
    let mut removed: Vec<DiffSegment> = Vec::new();
    let mut added: Vec<DiffSegment> = Vec::new();
    while i < a.len() || j < b.len() {
        if i < a.len() && j < b.len() && a[i] == b[j] {
            flush_run(&mut segments, &mut removed, &mut added);
            segments.push(DiffSegment::unchanged(a[i].clone(), b[j].clone()));
            i += 1;
            j += 1;
        } else if j >= b.len() || (i < a.len() && table[i + 1][j] >= table[i][j + 1]) {
            removed.push(DiffSegment::new(SegmentKind::Removed, a[i].clone()));
            i += 1;
        } else {
            added.push(DiffSegment::new(SegmentKind::Added, b[j].clone()));
            j += 1;
        }
    }
    flush_run(&mut segments, &mut removed, &mut added);

    let tail = current[current.len() - suffix..]
        .iter()
        .zip(&proposed[proposed.len() - suffix..]);
    for (a, b) in tail {
        segments.push(DiffSegment::unchanged(a.clone(), b.clone()));
    }

    BlockDiff { segments }
}

/// Extract blocks from both documents and align them.
pub fn diff_markup(current: &str, proposed: &str) -> BlockDiff {
    diff_blocks(&extract_blocks(current), &extract_blocks(proposed))
}

fn flush_run(
    segments: &mut Vec<DiffSegment>,
    removed: &mut Vec<DiffSegment>,
    added: &mut Vec<DiffSegment>,
) {
    segments.append(removed);
    segments.append(added);
}

/// Length of the shared suffix the walk would match anyway.
///
/// A suffix block equal to some block in the middle could be matched earlier
/// by the leftmost-greedy walk, so such blocks, and every suffix block before
/// them, stay in the middle. What remains aligns identically with or without
/// the table.
fn matched_suffix(a: &[Block], b: &[Block]) -> usize {
    let mut suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    while suffix > 0 {
        let middle: HashSet<&Block> = a[..a.len() - suffix]
            .iter()
            .chain(&b[..b.len() - suffix])
            .collect();
        let tail = &a[a.len() - suffix..];
        match tail.iter().rposition(|block| middle.contains(block)) {
            Some(p) => suffix -= p + 1,
            None => break,
        }
    }
    suffix
}

/// `table[i][j]` is the LCS length of `a[i..]` and `b[j..]`.
fn lcs_table(a: &[Block], b: &[Block]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(diff: &BlockDiff) -> Vec<(SegmentKind, String)> {
        diff.segments
            .iter()
            .map(|s| (s.kind, s.block.text_content().to_string()))
            .collect()
    }

    fn seg(kind: SegmentKind, text: &str) -> (SegmentKind, String) {
        (kind, text.to_string())
    }

    use SegmentKind::{Added, Removed, Unchanged};

    // -----------------------------------------------------------------------
    // Alignment
    // -----------------------------------------------------------------------

    #[test]
    fn identical_documents_have_no_changes() {
        let diff = diff_markup("<p>a</p><p>b</p>", "<p>a</p>\n<p>b</p>");
        assert!(!diff.has_changes());
        assert_eq!(
            diff.stats(),
            DiffStats {
                unchanged: 2,
                added: 0,
                removed: 0
            }
        );
    }

    #[test]
    fn replaced_middle_block() {
        let diff = diff_markup("<p>A</p><p>B</p><p>C</p>", "<p>A</p><p>B2</p><p>C</p>");
        assert_eq!(
            kinds(&diff),
            vec![
                seg(Unchanged, "A"),
                seg(Removed, "B"),
                seg(Added, "B2"),
                seg(Unchanged, "C"),
            ]
        );
    }

    #[test]
    fn pure_insertion_and_deletion() {
        let diff = diff_markup("<p>A</p><p>C</p>", "<p>A</p><p>B</p><p>C</p>");
        assert_eq!(
            kinds(&diff),
            vec![seg(Unchanged, "A"), seg(Added, "B"), seg(Unchanged, "C")]
        );

        let diff = diff_markup("<p>A</p><p>B</p><p>C</p>", "<p>A</p><p>C</p>");
        assert_eq!(
            kinds(&diff),
            vec![seg(Unchanged, "A"), seg(Removed, "B"), seg(Unchanged, "C")]
        );
    }

    #[test]
    fn empty_sides() {
        let diff = diff_markup("", "<p>new</p>");
        assert_eq!(kinds(&diff), vec![seg(Added, "new")]);
        let diff = diff_markup("<p>old</p>", "");
        assert_eq!(kinds(&diff), vec![seg(Removed, "old")]);
        assert!(diff_markup("", "").segments.is_empty());
    }

    #[test]
    fn shared_suffix_stays_out_of_the_table() {
        let tail: String = (0..200).map(|i| format!("<p>tail {i}</p>")).collect();
        let diff = diff_markup(
            &format!("<p>head</p><p>old</p>{tail}"),
            &format!("<p>head</p><p>new</p>{tail}"),
        );
        assert_eq!(
            diff.stats(),
            DiffStats {
                unchanged: 201,
                added: 1,
                removed: 1
            }
        );
        assert_eq!(diff.segments[1].kind, Removed);
        assert_eq!(diff.segments[2].kind, Added);
        assert_eq!(diff.segments[3].block.text_content(), "tail 0");
    }

    #[test]
    fn suffix_repeating_a_middle_block_keeps_leftmost_match() {
        // Matching the trailing A would pull the insertions earlier.
        let diff = diff_markup("<p>X</p><p>A</p>", "<p>A</p><p>Y</p><p>A</p>");
        assert_eq!(
            kinds(&diff),
            vec![
                seg(Removed, "X"),
                seg(Unchanged, "A"),
                seg(Added, "Y"),
                seg(Added, "A"),
            ]
        );
    }

    #[test]
    fn repeated_blocks_match_leftmost() {
        let diff = diff_markup("<p>A</p>", "<p>A</p><p>A</p>");
        assert_eq!(kinds(&diff), vec![seg(Unchanged, "A"), seg(Added, "A")]);
    }

    #[test]
    fn removals_precede_additions_in_a_run() {
        let diff = diff_markup(
            "<p>A</p><p>x</p><p>y</p><p>Z</p>",
            "<p>A</p><p>1</p><p>2</p><p>3</p><p>Z</p>",
        );
        assert_eq!(
            kinds(&diff),
            vec![
                seg(Unchanged, "A"),
                seg(Removed, "x"),
                seg(Removed, "y"),
                seg(Added, "1"),
                seg(Added, "2"),
                seg(Added, "3"),
                seg(Unchanged, "Z"),
            ]
        );
    }

    #[test]
    fn moved_block_is_remove_and_add() {
        let diff = diff_markup("<p>A</p><p>B</p>", "<p>B</p><p>A</p>");
        let stats = diff.stats();
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
    }

    #[test]
    fn whitespace_and_attribute_order_are_not_changes() {
        let diff = diff_markup(
            r#"<p class="a" id="b">Hi</p>"#,
            "<p id=\"b\"\n   class=\"a\">Hi</p>",
        );
        assert!(!diff.has_changes());
        // Each side keeps its own attribute order.
        assert_eq!(diff.to_markup(Side::Current), r#"<p class="a" id="b">Hi</p>"#);
        assert_eq!(diff.to_markup(Side::Proposed), r#"<p id="b" class="a">Hi</p>"#);
    }

    #[test]
    fn render_hints() {
        assert_eq!(
            SegmentKind::Removed.render_hint(),
            RenderHint {
                editable: false,
                struck: true,
                highlighted: false
            }
        );
        assert!(SegmentKind::Added.render_hint().editable);
        assert!(SegmentKind::Added.render_hint().highlighted);
        assert!(!SegmentKind::Unchanged.render_hint().highlighted);
    }

    // -----------------------------------------------------------------------
    // Reconstruction
    // -----------------------------------------------------------------------

    fn block_markup() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-e]{1,3}".prop_map(|t| format!("<p>{t}</p>")),
            "[a-c]{1,2}".prop_map(|t| format!("<h2>{t}</h2>")),
            "[a-c]".prop_map(|t| format!("<ul><li>{t}</li></ul>")),
            Just("<hr>".to_string()),
        ]
    }

    fn document() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(block_markup(), 0..12)
    }

    /// Segment kinds of the leftmost-greedy walk over one full table.
    fn full_table_kinds(a: &[Block], b: &[Block]) -> Vec<SegmentKind> {
        let table = lcs_table(a, b);
        let (mut i, mut j) = (0, 0);
        let mut kinds = Vec::new();
        let (mut removed, mut added) = (0, 0);
        let flush = |kinds: &mut Vec<SegmentKind>, removed: &mut usize, added: &mut usize| {
            kinds.extend(std::iter::repeat(Removed).take(*removed));
            kinds.extend(std::iter::repeat(Added).take(*added));
            *removed = 0;
            *added = 0;
        };
        while i < a.len() || j < b.len() {
            if i < a.len() && j < b.len() && a[i] == b[j] {
                flush(&mut kinds, &mut removed, &mut added);
                kinds.push(Unchanged);
                i += 1;
                j += 1;
            } else if j >= b.len() || (i < a.len() && table[i + 1][j] >= table[i][j + 1]) {
                removed += 1;
                i += 1;
            } else {
                added += 1;
                j += 1;
            }
        }
        flush(&mut kinds, &mut removed, &mut added);
        kinds
    }

    proptest! {
        #[test]
        fn trimming_does_not_change_alignment(current in document(), proposed in document()) {
            let a = extract_blocks(&current.concat());
            let b = extract_blocks(&proposed.concat());
            let kinds: Vec<SegmentKind> = diff_blocks(&a, &b).segments.iter().map(|s| s.kind).collect();
            prop_assert_eq!(kinds, full_table_kinds(&a, &b));
        }

        #[test]
        fn sides_reconstruct_inputs(current in document(), proposed in document()) {
            let diff = diff_markup(&current.join("\n"), &proposed.join("\n"));
            prop_assert_eq!(diff.to_markup(Side::Current), current.join("\n"));
            prop_assert_eq!(diff.to_markup(Side::Proposed), proposed.join("\n"));
        }

        #[test]
        fn unchanged_count_is_lcs_length(current in document(), proposed in document()) {
            let a = extract_blocks(&current.concat());
            let b = extract_blocks(&proposed.concat());
            let diff = diff_blocks(&a, &b);
            prop_assert_eq!(diff.stats().unchanged, lcs_table(&a, &b)[0][0]);
        }
    }
}

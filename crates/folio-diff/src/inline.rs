//! Word-level changes inside a replaced block.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::block::Block;
use crate::block_diff::SegmentKind;

/// A run of words with one change kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineChange {
    pub kind: SegmentKind,
    pub text: String,
}

/// Word diff of two strings. Adjacent pieces of the same kind are merged.
pub fn inline_changes(old: &str, new: &str) -> Vec<InlineChange> {
    let diff = TextDiff::from_words(old, new);
    let mut changes: Vec<InlineChange> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SegmentKind::Unchanged,
            ChangeTag::Insert => SegmentKind::Added,
            ChangeTag::Delete => SegmentKind::Removed,
        };
        match changes.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => changes.push(InlineChange {
                kind,
                text: change.value().to_string(),
            }),
        }
    }
    changes
}

/// Word diff of the visible text of a removed/added block pair.
pub fn inline_block_changes(old: &Block, new: &Block) -> Vec<InlineChange> {
    inline_changes(&old.text_content(), &new.text_content())
}

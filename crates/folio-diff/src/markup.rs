//! Inline diff wrappers for editing surfaces.
//!
//! A rendered proposal is a single markup document in which every run of
//! changes is wrapped as
//!
//! ```text
//! <diff><diff-old>…</diff-old><diff-new>…</diff-new></diff>
//! ```
//!
//! Removed and added blocks of a run are paired by position; when one side
//! of the run is longer, the extra blocks get a wrapper with an empty
//! counterpart. Stripping the wrappers resolves the document to one side.
//! Wrappers written by other editors may omit a half, list the halves in
//! either order, or carry attributes; stripping accepts all of those.

use crate::block_diff::{diff_markup, BlockDiff, SegmentKind};
use crate::data::Side;

const DIFF: &str = "diff";
const OLD: &str = "diff-old";
const NEW: &str = "diff-new";
const DIFF_CLOSE: &str = "</diff>";
const OLD_CLOSE: &str = "</diff-old>";
const NEW_CLOSE: &str = "</diff-new>";

/// Render the proposal of `proposed` over `current` with diff wrappers.
pub fn render_diff_markup(current: &str, proposed: &str) -> String {
    render_block_diff(&diff_markup(current, proposed))
}

/// Render an already computed diff with diff wrappers.
pub fn render_block_diff(diff: &BlockDiff) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(diff.segments.len());
    let mut removed: Vec<&str> = Vec::new();
    let mut added: Vec<&str> = Vec::new();

    for segment in &diff.segments {
        match segment.kind {
            SegmentKind::Removed => removed.push(segment.block.html()),
            SegmentKind::Added => added.push(segment.block.html()),
            SegmentKind::Unchanged => {
                wrap_run(&mut parts, &mut removed, &mut added);
                parts.push(segment.block.html().to_string());
            }
        }
    }
    wrap_run(&mut parts, &mut removed, &mut added);
    parts.join("\n")
}

fn wrap_run(parts: &mut Vec<String>, removed: &mut Vec<&str>, added: &mut Vec<&str>) {
    for k in 0..removed.len().max(added.len()) {
        let old = removed.get(k).copied().unwrap_or("");
        let new = added.get(k).copied().unwrap_or("");
        parts.push(format!(
            "<{DIFF}><{OLD}>{old}{OLD_CLOSE}<{NEW}>{new}{NEW_CLOSE}{DIFF_CLOSE}"
        ));
    }
    removed.clear();
    added.clear();
}

/// Resolve every diff wrapper in `markup` to the content of `side`.
///
/// Each wrapper is resolved on its own. Either half may be missing; a
/// wrapper without the chosen half resolves to nothing. Blocks are rejoined
/// one per line and empty wrapper halves vanish. A wrapper that is not well
/// formed is copied through and scanning continues after it.
pub fn strip_diff_markup(markup: &str, side: Side) -> String {
    // ASCII lowercasing keeps byte offsets, so positions found in `lower`
    // slice `markup` directly.
    let lower = markup.to_ascii_lowercase();
    let mut parts: Vec<&str> = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = find_open_tag(&lower[cursor..], DIFF) {
        let start = cursor + offset;
        match parse_wrapper(&lower[start..], &markup[start..], side) {
            Some((chosen, consumed)) => {
                parts.push(&markup[literal_start..start]);
                parts.push(chosen);
                cursor = start + consumed;
                literal_start = cursor;
            }
            None => cursor = start + 1,
        }
    }
    parts.push(&markup[literal_start..]);

    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse one wrapper at the start of `s`. `lower` is `s` lowercased. Returns
/// the chosen half and the number of bytes the wrapper spans.
fn parse_wrapper<'a>(lower: &str, s: &'a str, side: Side) -> Option<(&'a str, usize)> {
    let mut i = open_tag_len(lower, DIFF)?;
    let mut old: Option<&str> = None;
    let mut new: Option<&str> = None;
    loop {
        i += lower[i..].len() - lower[i..].trim_start().len();
        let rest = &lower[i..];
        if rest.starts_with(DIFF_CLOSE) {
            i += DIFF_CLOSE.len();
            break;
        }
        let (half, name, close) = if old.is_none() && open_tag_len(rest, OLD).is_some() {
            (&mut old, OLD, OLD_CLOSE)
        } else if new.is_none() && open_tag_len(rest, NEW).is_some() {
            (&mut new, NEW, NEW_CLOSE)
        } else {
            return None;
        };
        let body_start = i + open_tag_len(rest, name)?;
        let body_len = lower[body_start..].find(close)?;
        *half = Some(&s[body_start..body_start + body_len]);
        i = body_start + body_len + close.len();
    }
    let chosen = match side {
        Side::Current => old,
        Side::Proposed => new,
    };
    Some((chosen.unwrap_or(""), i))
}

/// Byte offset of the first `<name>` or `<name …>` opening tag in `s`.
fn find_open_tag(s: &str, name: &str) -> Option<usize> {
    let needle = format!("<{name}");
    let mut from = 0;
    while let Some(offset) = s[from..].find(&needle) {
        let at = from + offset;
        if open_tag_len(&s[at..], name).is_some() {
            return Some(at);
        }
        from = at + needle.len();
    }
    None
}

/// If `s` starts with an opening `name` tag, the length of that tag.
fn open_tag_len(s: &str, name: &str) -> Option<usize> {
    let rest = s.strip_prefix('<')?.strip_prefix(name)?;
    match rest.chars().next()? {
        '>' => Some(name.len() + 2),
        c if c.is_whitespace() => Some(s.find('>')? + 1),
        _ => None,
    }
}

/// Returns `true` if `markup` still contains unresolved diff wrappers.
pub fn has_diff_markup(markup: &str) -> bool {
    find_open_tag(&markup.to_ascii_lowercase(), DIFF).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_document_has_no_wrappers() {
        let out = render_diff_markup("<p>a</p><p>b</p>", "<p>a</p><p>b</p>");
        assert_eq!(out, "<p>a</p>\n<p>b</p>");
        assert!(!has_diff_markup(&out));
    }

    #[test]
    fn replacement_is_one_paired_wrapper() {
        let out = render_diff_markup("<p>A</p><p>B</p>", "<p>A</p><p>B2</p>");
        assert_eq!(
            out,
            "<p>A</p>\n<diff><diff-old><p>B</p></diff-old><diff-new><p>B2</p></diff-new></diff>"
        );
        assert!(has_diff_markup(&out));
    }

    #[test]
    fn uneven_run_pairs_by_position() {
        let out = render_diff_markup("<p>x</p>", "<p>1</p><p>2</p>");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "<diff><diff-old><p>x</p></diff-old><diff-new><p>1</p></diff-new></diff>",
                "<diff><diff-old></diff-old><diff-new><p>2</p></diff-new></diff>",
            ]
        );
    }

    #[test]
    fn strip_resolves_each_side() {
        let current = "<h1>T</h1>\n<p>old</p>\n<p>gone</p>\n<p>end</p>";
        let proposed = "<h1>T</h1>\n<p>new</p>\n<p>end</p>";
        let rendered = render_diff_markup(current, proposed);
        assert_eq!(strip_diff_markup(&rendered, Side::Current), current);
        assert_eq!(strip_diff_markup(&rendered, Side::Proposed), proposed);
    }

    #[test]
    fn strip_tolerates_whitespace_inside_wrapper() {
        let markup = "<diff>\n  <diff-old><p>a</p></diff-old>\n  <diff-new><p>b</p></diff-new>\n</diff>";
        assert_eq!(strip_diff_markup(markup, Side::Proposed), "<p>b</p>");
    }

    #[test]
    fn malformed_wrapper_is_left_alone() {
        let markup = "<p>x</p><diff><diff-old>dangling";
        assert_eq!(strip_diff_markup(markup, Side::Current), markup);
    }

    #[test]
    fn one_sided_wrappers_resolve_independently() {
        let markup = "<p>keep</p><diff><diff-new><p>added</p></diff-new></diff>\
                      <diff><diff-old><p>a</p></diff-old><diff-new><p>b</p></diff-new></diff>";
        assert_eq!(strip_diff_markup(markup, Side::Current), "<p>keep</p>\n<p>a</p>");
        assert_eq!(
            strip_diff_markup(markup, Side::Proposed),
            "<p>keep</p>\n<p>added</p>\n<p>b</p>"
        );
        assert!(!has_diff_markup(&strip_diff_markup(markup, Side::Current)));
    }

    #[test]
    fn halves_in_either_order() {
        let markup = "<diff><diff-new>N</diff-new><diff-old>O</diff-old></diff>";
        assert_eq!(strip_diff_markup(markup, Side::Current), "O");
        assert_eq!(strip_diff_markup(markup, Side::Proposed), "N");
    }

    #[test]
    fn malformed_wrapper_does_not_stop_later_ones() {
        let markup = "<diff><p>junk</p></diff>\n<diff><diff-old>a</diff-old><diff-new>b</diff-new></diff>";
        assert_eq!(
            strip_diff_markup(markup, Side::Proposed),
            "<diff><p>junk</p></diff>\nb"
        );
    }

    #[test]
    fn attributes_and_case_are_accepted() {
        let markup = r#"<DIFF data-id="1"><Diff-Old class="x">a</Diff-Old><diff-new>b</DIFF-NEW></Diff>"#;
        assert!(has_diff_markup(markup));
        assert_eq!(strip_diff_markup(markup, Side::Current), "a");
        assert!(has_diff_markup("<diff class=\"pending\"></diff>"));
        assert!(!has_diff_markup("<diff-old>x</diff-old><different>"));
    }

    #[test]
    fn strip_without_wrappers_is_identity_on_blocks() {
        assert_eq!(strip_diff_markup("<p>a</p>", Side::Current), "<p>a</p>");
        assert_eq!(strip_diff_markup("", Side::Proposed), "");
    }
}

//! Block extraction: split a markup document into its top-level structural
//! elements.
//!
//! The document is parsed as an HTML body fragment with `scraper`, so block
//! boundaries follow the same rules a browser applies, implicit end tags
//! included. A paragraph spread over five lines is one block; a list is one
//! block however many items it holds. Stray top-level text becomes a text
//! block so no content is lost. Comments and declarations at the top level
//! are not blocks.

use std::fmt;
use std::hash::{Hash, Hasher};

use scraper::{ElementRef, Html, Node};
use serde::Serialize;

/// One top-level structural unit of a markup document.
///
/// Blocks compare equal iff their normalized forms are identical: tag names
/// and attribute names are lowercased, attributes are sorted, and whitespace
/// is collapsed. The parsed markup is kept for rendering.
#[derive(Clone, Serialize)]
pub struct Block {
    tag: Option<String>,
    html: String,
    #[serde(skip)]
    norm: String,
    #[serde(skip)]
    inner: Option<String>,
    #[serde(skip)]
    text: String,
}

impl Block {
    fn element(el: ElementRef<'_>) -> Self {
        let name = el.value().name().to_string();
        let html = el.html();
        // Void elements serialize without a closing tag and have no content.
        let inner = html
            .ends_with(&format!("</{name}>"))
            .then(|| el.inner_html());

        let mut attrs: Vec<String> = el
            .value()
            .attrs()
            .map(|(attr, value)| format!("{attr}=\"{value}\""))
            .collect();
        attrs.sort();
        let attrs: String = attrs.iter().map(|a| format!(" {a}")).collect();
        let norm = match &inner {
            Some(inner) => {
                let inner = collapse_whitespace(inner).replace("> <", "><");
                format!("<{name}{attrs}>{inner}</{name}>")
            }
            None => format!("<{name}{attrs}>"),
        };

        Self {
            text: collapse_whitespace(&el.text().collect::<String>()),
            tag: Some(name),
            html,
            norm,
            inner,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            tag: None,
            norm: collapse_whitespace(text),
            html: escape_text(text),
            inner: None,
            text: collapse_whitespace(text),
        }
    }

    /// Lowercased tag name, or `None` for a text block.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }

    /// The block's markup as serialized by the parser.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The canonical form used for equality.
    pub fn normalized(&self) -> &str {
        &self.norm
    }

    /// Markup between the opening and closing tag. `None` for void elements
    /// and text blocks.
    pub fn inner_html(&self) -> Option<&str> {
        self.inner.as_deref()
    }

    /// Text content with tags removed and whitespace collapsed.
    pub fn text_content(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.norm == other.norm
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.norm.hash(state);
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "Block(<{tag}> {:?})", self.norm),
            None => write!(f, "Block(text {:?})", self.norm),
        }
    }
}

/// Split `markup` into its top-level blocks, in document order.
pub fn extract_blocks(markup: &str) -> Vec<Block> {
    let fragment = Html::parse_fragment(markup);
    let mut blocks = Vec::new();
    for child in fragment.root_element().children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    blocks.push(Block::element(el));
                }
            }
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    blocks.push(Block::text(text));
                }
            }
            _ => {}
        }
    }
    blocks
}

/// Collapse every whitespace run to one space and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(markup: &str) -> Vec<Option<String>> {
        extract_blocks(markup)
            .iter()
            .map(|b| b.tag().map(str::to_string))
            .collect()
    }

    #[test]
    fn empty_document_has_no_blocks() {
        assert!(extract_blocks("").is_empty());
        assert!(extract_blocks("  \n\t ").is_empty());
    }

    #[test]
    fn top_level_elements_become_blocks() {
        let blocks = extract_blocks("<h1>Title</h1>\n<p>One</p>\n<ul><li>a</li><li>b</li></ul>");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].tag(), Some("h1"));
        assert_eq!(blocks[1].html(), "<p>One</p>");
        assert_eq!(blocks[2].html(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn implicit_end_tags_split_blocks() {
        let blocks = extract_blocks("<p>one<p>two<p>three");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].html(), "<p>three</p>");

        let blocks = extract_blocks("<ul><li>a<li>b</ul><p>after");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].html(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn implicit_end_tag_keeps_unchanged_paragraphs_aligned() {
        let a = extract_blocks("<p>one<p>two<p>three");
        let b = extract_blocks("<p>one</p><p>two</p><p>THREE</p>");
        assert_eq!(a[0], b[0]);
        assert_eq!(a[1], b[1]);
        assert_ne!(a[2], b[2]);
    }

    #[test]
    fn nested_same_name_elements_stay_in_one_block() {
        let blocks = extract_blocks("<div><div>inner</div></div><p>after</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].html(), "<div><div>inner</div></div>");
        assert_eq!(blocks[0].inner_html(), Some("<div>inner</div>"));
    }

    #[test]
    fn multiline_paragraph_is_one_block() {
        let blocks = extract_blocks("<p>\n  line one\n  line two\n</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].normalized(), "<p>line one line two</p>");
    }

    #[test]
    fn void_elements() {
        assert_eq!(
            tags("<hr><img src=\"a.png\"/><p>x</p><br>"),
            vec![
                Some("hr".into()),
                Some("img".into()),
                Some("p".into()),
                Some("br".into())
            ]
        );
        let blocks = extract_blocks("<hr>");
        assert_eq!(blocks[0].inner_html(), None);
        assert_eq!(blocks[0].normalized(), "<hr>");
    }

    #[test]
    fn empty_element_has_empty_inner_html() {
        let blocks = extract_blocks("<p></p>");
        assert_eq!(blocks[0].inner_html(), Some(""));
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        assert_eq!(
            tags("<!DOCTYPE html><!-- <p>hidden</p> --><p>shown</p>"),
            vec![Some("p".into())]
        );
    }

    #[test]
    fn comment_inside_block_does_not_close_it() {
        let blocks = extract_blocks("<div><!-- </div> --><p>x</p></div>");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn quoted_gt_in_attribute() {
        let blocks = extract_blocks(r#"<p title="a > b">x</p><p>y</p>"#);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].html(), r#"<p title="a > b">x</p>"#);
    }

    #[test]
    fn raw_text_elements_are_opaque() {
        let blocks = extract_blocks("<pre>a</pre><script>if (a < b) { x = '</p>'; }</script><p>z</p>");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].tag(), Some("script"));
        assert_eq!(blocks[2].html(), "<p>z</p>");
    }

    #[test]
    fn stray_text_becomes_text_block() {
        let blocks = extract_blocks("loose words <p>x</p> trailing");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].is_text());
        assert_eq!(blocks[0].html(), "loose words");
        assert!(blocks[2].is_text());
    }

    #[test]
    fn less_than_in_text_is_not_a_tag() {
        let blocks = extract_blocks("a < b and 3 <4");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text_content(), "a < b and 3 <4");
        assert_eq!(blocks[0].html(), "a &lt; b and 3 &lt;4");
    }

    #[test]
    fn unclosed_element_runs_to_end() {
        let blocks = extract_blocks("<p>first</p><div>never closed<p>x</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].html(), "<div>never closed<p>x</p></div>");
    }

    #[test]
    fn unmatched_close_tag_is_ignored() {
        let blocks = extract_blocks("</span><p>a</b>b</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].html(), "<p>ab</p>");
    }

    #[test]
    fn normalization_ignores_attribute_order_and_case() {
        let a = &extract_blocks(r#"<P class="x" id="y">Hi</P>"#)[0];
        let b = &extract_blocks(r#"<p id="y"   class="x">Hi</p>"#)[0];
        assert_eq!(a, b);
        assert_eq!(a.normalized(), r#"<p class="x" id="y">Hi</p>"#);
    }

    #[test]
    fn normalization_collapses_inter_tag_whitespace() {
        let a = &extract_blocks("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>")[0];
        let b = &extract_blocks("<ul><li>a</li><li>b</li></ul>")[0];
        assert_eq!(a, b);
    }

    #[test]
    fn content_differences_are_not_normalized_away() {
        let a = &extract_blocks(r#"<p><img src="a.png"></p>"#)[0];
        let b = &extract_blocks(r#"<p><img src="b.png"></p>"#)[0];
        assert_ne!(a, b);
    }

    #[test]
    fn text_content_strips_tags() {
        let block = &extract_blocks("<p>Hello <strong>big</strong>\n world</p>")[0];
        assert_eq!(block.text_content(), "Hello big world");
    }

    #[test]
    fn multibyte_text_is_handled() {
        let blocks = extract_blocks("héllo <p>naïve — ok</p> 日本");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].text_content(), "naïve — ok");
        assert_eq!(blocks[2].html(), "日本");
    }
}

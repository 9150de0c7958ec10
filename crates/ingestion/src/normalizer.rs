//! Markup normalization
//!
//! Articles arrive from the CMS as rendered HTML. Embedding quality
//! depends on clean prose, so script/style subtrees are dropped entirely
//! and the remaining text is flattened to single-spaced sentences.
//! Parsing is lenient: malformed markup degrades to best-effort text
//! extraction, never an error.

use scraper::node::Node;
use scraper::Html;

/// Elements whose text content is never prose
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript"];

/// Extract visible text from markup.
///
/// Block boundaries become single spaces, whitespace runs collapse, and
/// the result is trimmed. Empty or whitespace-only input yields an empty
/// string.
pub fn normalize(markup: &str) -> String {
    if markup.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(markup);
    let mut raw = String::new();
    collect_text(document.tree.root(), &mut raw);

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text);
                // Separator between adjacent blocks; collapsed later
                out.push(' ');
            }
            Node::Element(element) => {
                if !NON_CONTENT_TAGS.contains(&element.name()) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

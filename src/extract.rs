//! HTML to visible text extraction.
//!
//! Strips markup, scripts and styles from a raw HTML document and returns
//! the human-readable text, ready for fingerprinting. Whitespace is left
//! un-normalized; the fingerprint step collapses it.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose subtrees never contribute visible text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the visible text of a raw HTML document.
///
/// Walks the `body` subtree (the whole document when no `body` is present,
/// e.g. for fragments), skipping script/style subtrees and concatenating
/// text nodes separated by spaces.
pub fn extract_visible_text(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);
    let body = Selector::parse("body").unwrap();

    let root = document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    collect_text(root, &mut text);
    text
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            if SKIPPED_ELEMENTS.contains(&el.value().name()) {
                continue;
            }
            collect_text(el, out);
        } else if let Node::Text(t) = child.value() {
            out.push_str(&t.text);
            out.push(' ');
        }
    }
}

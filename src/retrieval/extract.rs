//! Main-text extraction from raw HTML.
//!
//! Boilerplate subtrees are skipped entirely, then the first content
//! container that yields text wins.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose whole subtree is dropped.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "button", "template",
];

/// Content containers in priority order.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract the readable article text of an HTML document.
///
/// Returns `None` when no container holds any non-whitespace text.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let mut text = String::new();
            collect_text(element, &mut text);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_owned());
            }
        }
    }

    None
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
            }
            Node::Element(el) => {
                if BOILERPLATE_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    // keep adjacent blocks from fusing into one word
                    out.push(' ');
                    collect_text(child_el, out);
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

use scraper::{Html, Node, Selector};

use navigator_core::types::PageDocument;

/// Elements whose text never reaches the reader.
const SKIPPED: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Title and visible text of an HTML page, one text run per line.
pub fn extract_document(html: &str, source: &str) -> PageDocument {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next().map(|t| collapse_whitespace(&t.text().collect::<String>())))
        .filter(|t| !t.is_empty());

    let mut lines = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(e) => SKIPPED.contains(&e.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        let line = collapse_whitespace(&text.text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    PageDocument { title, source: source.to_string(), content: lines.join("\n") }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

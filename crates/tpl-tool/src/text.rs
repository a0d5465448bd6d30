use roxmltree::{Document, Node};

use crate::TplToolError;

/// Plain text of a document body: one line per paragraph or heading, list
/// items prefixed with `- `. Reads `office:body/office:text` when present,
/// the root element otherwise.
pub fn odt_text_content(xml: &str) -> Result<String, TplToolError> {
    let document = Document::parse(xml)?;
    let root = document.root_element();
    let body_text = child_named(root, "body").and_then(|body| child_named(body, "text"));
    Ok(element_text(body_text.unwrap_or(root)))
}

fn child_named<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == local)
}

fn element_text(node: Node<'_, '_>) -> String {
    match node.tag_name().name() {
        "h" | "p" => {
            let mut line = node
                .descendants()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .collect::<String>();
            line.push('\n');
            line
        }
        name => {
            let inner = node
                .children()
                .filter(|child| child.is_element())
                .map(element_text)
                .collect::<String>();
            if name == "list-item" {
                format!("- {}", inner)
            } else {
                inner
            }
        }
    }
}

use roxmltree::{Document, Node, NodeType};
use tpl_core::TemplateError;

use crate::tree::{Attribute, ElementData, NamespaceDecl, NodeId, NodeKind, Tree};

const XML_PREFIX: &str = "xml";

pub fn parse_document(source: &str) -> Result<Tree, TemplateError> {
    let document = Document::parse(source)
        .map_err(|error| TemplateError::xml("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(TemplateError::xml(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    let mut tree = Tree::new(element_data(root));
    let range = root.range();
    tree.set_prolog(source.get(..range.start).unwrap_or_default());
    tree.set_epilog(source.get(range.end..).unwrap_or_default());
    let tree_root = tree.root();
    append_children(&mut tree, tree_root, root)?;
    Ok(tree)
}

fn append_children(
    tree: &mut Tree,
    parent: NodeId,
    node: Node<'_, '_>,
) -> Result<(), TemplateError> {
    for child in node.children() {
        let kind = match child.node_type() {
            NodeType::Element => {
                let id = tree.new_element(element_data(child));
                tree.append_child(parent, id)?;
                append_children(tree, id, child)?;
                continue;
            }
            NodeType::Text => match child.text() {
                Some(value) if !value.is_empty() => NodeKind::Text(value.to_string()),
                _ => continue,
            },
            NodeType::Comment => NodeKind::Comment(child.text().unwrap_or_default().to_string()),
            NodeType::PI => match child.pi() {
                Some(pi) => NodeKind::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(ToString::to_string),
                },
                None => continue,
            },
            NodeType::Root => continue,
        };
        let id = tree.new_node(kind);
        tree.append_child(parent, id)?;
    }
    Ok(())
}

fn element_data(node: Node<'_, '_>) -> ElementData {
    let tag = node.tag_name();
    let mut data = ElementData::new(qualified_name(
        node,
        tag.namespace(),
        tag.name(),
        true,
    ));

    for attribute in node.attributes() {
        data.attributes.push(Attribute {
            name: qualified_name(node, attribute.namespace(), attribute.name(), false),
            value: attribute.value().to_string(),
        });
    }

    data.namespaces = declared_namespaces(node);
    data
}

fn qualified_name(
    node: Node<'_, '_>,
    namespace: Option<&str>,
    local: &str,
    allow_default: bool,
) -> String {
    let prefix = namespace.and_then(|uri| {
        if allow_default {
            node.lookup_prefix(uri)
        } else {
            // Unprefixed attributes are never in a namespace, so only a named
            // binding applies.
            node.namespaces()
                .find(|ns| ns.uri() == uri && ns.name().is_some())
                .and_then(|ns| ns.name())
                .or_else(|| node.lookup_prefix(uri))
        }
    });
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

/// Namespaces in scope on `node` that its parent element does not already
/// bind the same way.
fn declared_namespaces(node: Node<'_, '_>) -> Vec<NamespaceDecl> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|ns| ns.name() != Some(XML_PREFIX))
        .filter(|ns| {
            parent.map_or(true, |parent| {
                !parent
                    .namespaces()
                    .any(|inherited| inherited.name() == ns.name() && inherited.uri() == ns.uri())
            })
        })
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(ToString::to_string),
            uri: ns.uri().to_string(),
        })
        .collect()
}

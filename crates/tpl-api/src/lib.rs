use tpl_core::{DataContext, FillOptions, TemplateError, TemplateValue};
use tpl_engine::TemplateEngine;
use tpl_xml::{parse_document, serialize_document, NodeId, Tree};

pub use tpl_core::{MissingValuePolicy, TemplateErrorKind};

pub const ODT_OFFICE_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
const DEFAULT_OFFICE_PREFIX: &str = "office";

/// Fills the whole document rooted at the first element of `xml`.
pub fn fill_template(xml: &str, data: &TemplateValue) -> Result<String, TemplateError> {
    fill_template_with_options(xml, data, &FillOptions::default())
}

pub fn fill_template_with_options(
    xml: &str,
    data: &TemplateValue,
    options: &FillOptions,
) -> Result<String, TemplateError> {
    let mut tree = parse_document(xml)?;
    let root = tree.root();
    tracing::debug!(nodes = tree.len(), "filling template document");
    fill_tree(&mut tree, root, data, options)?;
    serialize_document(&tree)
}

/// Fills an OpenDocument `content.xml`. Only `office:body/office:text` is
/// templated; styles, fonts and the rest of the part are kept as parsed.
pub fn fill_odt_content(
    content_xml: &str,
    data: &TemplateValue,
    options: &FillOptions,
) -> Result<String, TemplateError> {
    let mut tree = parse_document(content_xml)?;
    let text = odt_text_element(&tree)?;
    tracing::debug!(nodes = tree.len(), "filling odt content part");
    fill_tree(&mut tree, text, data, options)?;
    serialize_document(&tree)
}

/// `office:version` of a content part, needed by the package manifest.
pub fn odt_version(content_xml: &str) -> Result<Option<String>, TemplateError> {
    let tree = parse_document(content_xml)?;
    let prefix = office_prefix(&tree);
    let version = tree
        .element(tree.root())
        .and_then(|root| root.attribute(&format!("{}:version", prefix)))
        .map(ToString::to_string);
    Ok(version)
}

fn fill_tree(
    tree: &mut Tree,
    scope: NodeId,
    data: &TemplateValue,
    options: &FillOptions,
) -> Result<(), TemplateError> {
    let engine = TemplateEngine::new(options.clone());
    engine.fill_scope(tree, scope, &DataContext::new(data))
}

fn office_prefix(tree: &Tree) -> String {
    tree.element(tree.root())
        .and_then(|root| {
            root.namespaces
                .iter()
                .find(|ns| ns.uri == ODT_OFFICE_NAMESPACE)
                .and_then(|ns| ns.prefix.clone())
        })
        .unwrap_or_else(|| DEFAULT_OFFICE_PREFIX.to_string())
}

fn odt_text_element(tree: &Tree) -> Result<NodeId, TemplateError> {
    let prefix = office_prefix(tree);
    let body_name = format!("{}:body", prefix);
    let text_name = format!("{}:text", prefix);

    let body = find_child_element(tree, tree.root(), &body_name);
    let text = body.and_then(|body| find_child_element(tree, body, &text_name));
    text.ok_or_else(|| {
        TemplateError::xml(
            "ODT_TEXT_ELEMENT_MISSING",
            format!("Expected <{}> inside <{}>.", text_name, body_name),
        )
    })
}

fn find_child_element(tree: &Tree, parent: NodeId, name: &str) -> Option<NodeId> {
    tree.children(parent)
        .into_iter()
        .find(|child| tree.element(*child).is_some_and(|data| data.name == name))
}

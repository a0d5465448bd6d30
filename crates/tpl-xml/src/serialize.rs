use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tpl_core::TemplateError;

use crate::tree::{ElementData, NodeId, NodeKind, Tree};

/// Writes the document back out: source text before the root element, the
/// root itself, then source text after it.
pub fn serialize_document(tree: &Tree) -> Result<String, TemplateError> {
    let mut out = String::from(tree.prolog());
    out.push_str(&serialize_node(tree, tree.root())?);
    out.push_str(tree.epilog());
    Ok(out)
}

pub fn serialize_node(tree: &Tree, id: NodeId) -> Result<String, TemplateError> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, tree, id)?;
    String::from_utf8(writer.into_inner())
        .map_err(|error| TemplateError::internal("XML_WRITE_ERROR", error.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, tree: &Tree, id: NodeId) -> Result<(), TemplateError> {
    match tree.kind(id) {
        NodeKind::Text(text) => {
            let escaped = partial_escape(text.as_str());
            write_event(writer, Event::Text(BytesText::from_escaped(escaped)))
        }
        NodeKind::Comment(text) => {
            write_event(writer, Event::Comment(BytesText::from_escaped(text.as_str())))
        }
        NodeKind::ProcessingInstruction { target, value } => {
            let content = match value {
                Some(value) => format!("{} {}", target, value),
                None => target.clone(),
            };
            write_event(writer, Event::PI(BytesPI::new(content)))
        }
        NodeKind::Fragment => {
            for child in tree.children(id) {
                write_node(writer, tree, child)?;
            }
            Ok(())
        }
        NodeKind::Element(data) => {
            let start = start_tag(data);
            if !tree.has_children(id) {
                return write_event(writer, Event::Empty(start));
            }
            write_event(writer, Event::Start(start))?;
            for child in tree.children(id) {
                write_node(writer, tree, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(data.name.as_str())))
        }
    }
}

fn start_tag(data: &ElementData) -> BytesStart<'_> {
    let mut start = BytesStart::new(data.name.as_str());
    for ns in &data.namespaces {
        let key = match &ns.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        let value = attribute_value(&ns.uri);
        start.push_attribute((key.as_bytes(), value.as_bytes()));
    }
    for attribute in &data.attributes {
        let value = attribute_value(&attribute.value);
        start.push_attribute((attribute.name.as_bytes(), value.as_bytes()));
    }
    start
}

/// Escapes an attribute value. Tabs and line breaks become character
/// references, otherwise a reader normalizes them to spaces.
fn attribute_value(raw: &str) -> Cow<'_, str> {
    let escaped = escape(raw);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), TemplateError> {
    writer
        .write_event(event)
        .map_err(|error| TemplateError::internal("XML_WRITE_ERROR", error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn round_trip(source: &str) -> String {
        let tree = parse_document(source).expect("xml should parse");
        serialize_document(&tree).expect("xml should serialize")
    }

    #[test]
    fn serialize_document_round_trips_structure() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:office" xmlns:text="urn:text" office:version="1.3"><office:body><text:p text:style-name="P1">Yo <text:span>x</text:span></text:p><text:p/></office:body></office:document-content>"#;
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn serialize_document_adds_nothing_after_declaration() {
        assert_eq!(round_trip(r#"<?xml version="1.0"?><doc/>"#), r#"<?xml version="1.0"?><doc/>"#);
    }

    #[test]
    fn serialize_escapes_text_and_attributes() {
        assert_eq!(
            round_trip(r#"<a t="&quot;q&quot; &amp; &lt;">x &lt; y &amp; z's</a>"#),
            r#"<a t="&quot;q&quot; &amp; &lt;">x &lt; y &amp; z's</a>"#
        );
    }

    #[test]
    fn serialize_keeps_whitespace_references_in_attributes() {
        let output = round_trip("<doc a=\"x&#10;y&#9;z&#13;\">t</doc>");
        assert_eq!(output, "<doc a=\"x&#10;y&#9;z&#13;\">t</doc>");

        let reparsed = parse_document(&output).expect("output should parse");
        let root = reparsed.element(reparsed.root()).expect("root should be element");
        assert_eq!(root.attribute("a"), Some("x\ny\tz\r"));
    }

    #[test]
    fn serialize_keeps_comments_and_instructions() {
        let source = "<doc><!-- keep me --><?mark here?><p>a</p></doc>\n";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn serialize_node_flattens_fragment() {
        let mut tree = parse_document("<a/>").expect("xml should parse");
        let fragment = tree.new_fragment();
        let first = tree.new_text("1");
        let second = tree.new_text("2");
        tree.append_child(fragment, first).expect("append should pass");
        tree.append_child(fragment, second).expect("append should pass");

        assert_eq!(serialize_node(&tree, fragment).expect("xml should serialize"), "12");
    }
}

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tpl_core::TemplateError;
use tpl_xml::{traverse_unsettled, NodeId, Tree};

fn start_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{#each\s+([^}]+?)\s+as\s+([^}]+?)\s*\}").expect("each regex must compile")
    })
}

fn end_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{/each\}").expect("end each regex must compile"))
}

fn marker_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{#each\s+[^}]+?\s+as\s+[^}]+?\s*\}|\{/each\}")
            .expect("marker regex must compile")
    })
}

/// Whether `text` is exactly one loop marker, as left by [`isolate_markers`].
pub fn is_marker(text: &str) -> bool {
    marker_regex()
        .find(text)
        .is_some_and(|marker| marker.start() == 0 && marker.end() == text.len())
}

/// Marker text with the element holding it, for diagnostics.
pub fn describe_marker(tree: &Tree, id: NodeId) -> String {
    let text = tree.text(id).unwrap_or_default();
    match tree.parent(id).and_then(|parent| tree.element(parent)) {
        Some(element) => format!("'{}' in <{}> (node {})", text, element.name, id),
        None => format!("'{}' (node {})", text, id),
    }
}

/// A `{#each iterable as item}` … `{/each}` pair. `start` and `end` are the
/// text nodes carrying the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopBlock {
    pub start: NodeId,
    pub end: NodeId,
    pub iterable: String,
    pub item: String,
}

/// Splits text nodes so every loop marker sits alone in its own text node.
pub fn isolate_markers(
    tree: &mut Tree,
    scope: NodeId,
    settled: &HashSet<NodeId>,
) -> Result<(), TemplateError> {
    let mut splits = Vec::new();
    let view: &Tree = tree;
    traverse_unsettled(view, scope, settled, &mut |id| {
        let Some(text) = view.text(id) else {
            return;
        };
        let parts = split_on_markers(text);
        if parts.len() > 1 {
            splits.push((id, parts));
        }
    });

    for (id, parts) in splits {
        tree.replace_text_with_parts(id, parts)?;
    }
    Ok(())
}

fn split_on_markers(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cursor = 0usize;
    for marker in marker_regex().find_iter(text) {
        if marker.start() > cursor {
            parts.push(text[cursor..marker.start()].to_string());
        }
        parts.push(marker.as_str().to_string());
        cursor = marker.end();
    }
    if cursor < text.len() && cursor > 0 {
        parts.push(text[cursor..].to_string());
    }
    parts
}

/// Finds the first complete top-level loop block in document order.
pub fn find_next_block(
    tree: &Tree,
    scope: NodeId,
    settled: &HashSet<NodeId>,
) -> Result<Option<LoopBlock>, TemplateError> {
    let mut leaves = Vec::new();
    traverse_unsettled(tree, scope, settled, &mut |id| {
        if tree.is_leaf(id) && tree.text(id).is_some() {
            leaves.push(id);
        }
    });

    let mut open: Option<(NodeId, String, String)> = None;
    let mut nested = 0usize;

    for id in leaves {
        let text = tree.text(id).unwrap_or_default();

        if let Some(captures) = start_regex().captures(text) {
            if open.is_some() {
                nested += 1;
            } else {
                let iterable = captures.get(1).map_or("", |m| m.as_str()).trim();
                let item = captures.get(2).map_or("", |m| m.as_str()).trim();
                open = Some((id, iterable.to_string(), item.to_string()));
            }
        }

        if end_regex().is_match(text) {
            let Some((start, iterable, item)) = open.take() else {
                return Err(TemplateError::syntax(
                    "TEMPLATE_UNMATCHED_END",
                    "{/each} found without corresponding opening {#each x as y}.",
                ));
            };
            if nested > 0 {
                nested -= 1;
                open = Some((start, iterable, item));
                continue;
            }
            return Ok(Some(LoopBlock {
                start,
                end: id,
                iterable,
                item,
            }));
        }
    }

    if let Some((start, iterable, item)) = open {
        tracing::warn!(
            iterable = %iterable,
            item = %item,
            marker = %describe_marker(tree, start),
            "loop block is never closed, leaving markers in place"
        );
    }
    Ok(None)
}

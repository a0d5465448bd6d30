use std::collections::HashSet;

use tpl_core::{DataContext, TemplateError, TemplateValue};
use tpl_xml::{common_ancestor_and_anchors, post_order, NodeId, Tree};

use super::TemplateEngine;
use crate::expression::resolve;
use crate::loop_block::{describe_marker, is_marker, LoopBlock};

impl TemplateEngine {
    pub(super) fn expand_block(
        &self,
        tree: &mut Tree,
        block: &LoopBlock,
        context: &DataContext<'_>,
        settled: &mut HashSet<NodeId>,
        depth: usize,
    ) -> Result<(), TemplateError> {
        let anchors = common_ancestor_and_anchors(tree, block.start, block.end)?;
        ensure_anchor_holds_only_own_marker(tree, anchors.start, block.start)?;
        ensure_anchor_holds_only_own_marker(tree, anchors.end, block.end)?;

        let siblings = tree.children(anchors.ancestor);
        let between = siblings
            .iter()
            .skip_while(|id| **id != anchors.start)
            .skip(1)
            .take_while(|id| **id != anchors.end)
            .copied()
            .collect::<Vec<_>>();
        let fragment = tree.new_fragment();
        for id in between {
            tree.append_child(fragment, id)?;
        }

        let items = iterable_items(&block.iterable, context)?;
        tracing::debug!(
            iterable = %block.iterable,
            item = %block.item,
            count = items.len(),
            depth,
            "expanding loop block"
        );

        for item in items {
            let copy = tree.deep_clone(fragment)?;
            let item_context = context.bind(&block.item, item);
            self.fill_scope_at_depth(tree, copy, &item_context, depth + 1)?;
            let moved = tree.splice_before(copy, anchors.end)?;
            settled.extend(moved);
        }

        tree.detach(anchors.start);
        tree.detach(anchors.end);
        Ok(())
    }
}

/// Anchors are removed once the block is expanded, so any other loop marker
/// inside one would vanish with it.
fn ensure_anchor_holds_only_own_marker(
    tree: &Tree,
    anchor: NodeId,
    own_marker: NodeId,
) -> Result<(), TemplateError> {
    let stray = post_order(tree, anchor).into_iter().find(|id| {
        *id != own_marker && tree.text(*id).is_some_and(is_marker)
    });
    match stray {
        Some(id) => Err(TemplateError::syntax(
            "TEMPLATE_MARKER_IN_ANCHOR",
            format!(
                "Loop marker {} shares an element with an enclosing loop marker; put it in its own element.",
                describe_marker(tree, id)
            ),
        )),
        None => Ok(()),
    }
}

fn iterable_items<'a>(
    expression: &str,
    context: &DataContext<'a>,
) -> Result<&'a [TemplateValue], TemplateError> {
    match resolve(expression, context) {
        None | Some(TemplateValue::Null) => Err(TemplateError::data(
            "TEMPLATE_ITERABLE_MISSING",
            format!("Missing iterable ({}).", expression),
        )),
        Some(TemplateValue::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(TemplateError::data(
            "TEMPLATE_ITERABLE_NOT_SEQUENCE",
            format!(
                "'{}' is not iterable (found {}).",
                expression,
                other.type_name()
            ),
        )),
    }
}

use std::collections::HashSet;

use tpl_core::{DataContext, MissingValuePolicy, TemplateError};
use tpl_xml::{traverse_unsettled, NodeId, NodeKind, Tree};

use crate::placeholder::scan;

enum Rewrite {
    Text { node: NodeId, value: String },
    Attribute { node: NodeId, index: usize, value: String },
}

/// Fills placeholders in every unsettled text node and attribute value under
/// `scope`.
pub(super) fn substitute_scope(
    tree: &mut Tree,
    scope: NodeId,
    context: &DataContext<'_>,
    settled: &HashSet<NodeId>,
    policy: MissingValuePolicy,
) -> Result<(), TemplateError> {
    let mut targets = Vec::new();
    traverse_unsettled(tree, scope, settled, &mut |id| targets.push(id));

    let mut rewrites = Vec::new();
    for id in targets {
        match tree.kind(id) {
            NodeKind::Text(text) => {
                if let Some(plan) = scan(text) {
                    rewrites.push(Rewrite::Text {
                        node: id,
                        value: plan.fill(context, policy)?,
                    });
                }
            }
            NodeKind::Element(data) => {
                for (index, attribute) in data.attributes.iter().enumerate() {
                    if let Some(plan) = scan(&attribute.value) {
                        rewrites.push(Rewrite::Attribute {
                            node: id,
                            index,
                            value: plan.fill(context, policy)?,
                        });
                    }
                }
            }
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction { .. } | NodeKind::Fragment => {}
        }
    }

    for rewrite in rewrites {
        match rewrite {
            Rewrite::Text { node, value } => {
                *tree.kind_mut(node) = NodeKind::Text(value);
            }
            Rewrite::Attribute { node, index, value } => {
                if let NodeKind::Element(data) = tree.kind_mut(node) {
                    if let Some(attribute) = data.attributes.get_mut(index) {
                        attribute.value = value;
                    }
                }
            }
        }
    }
    Ok(())
}

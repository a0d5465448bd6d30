use std::collections::HashSet;

use tpl_core::TemplateError;

use crate::tree::{NodeId, Tree};

/// Lowest common ancestor of two nodes and the direct children of it that
/// lead to each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub ancestor: NodeId,
    pub start: NodeId,
    pub end: NodeId,
}

/// Both ancestor chains grow one step at a time; the first node reached
/// by both is the lowest common ancestor.
pub fn common_ancestor_and_anchors(
    tree: &Tree,
    a: NodeId,
    b: NodeId,
) -> Result<Anchors, TemplateError> {
    let mut climb_a = tree.ancestors(a);
    let mut climb_b = tree.ancestors(b);
    let mut chain_a = Vec::new();
    let mut chain_b = Vec::new();
    let mut seen_a = HashSet::new();
    let mut seen_b = HashSet::new();

    let ancestor = loop {
        let next_a = climb_a.next();
        let next_b = climb_b.next();
        if next_a.is_none() && next_b.is_none() {
            return Err(TemplateError::internal(
                "TREE_DISJOINT_NODES",
                format!("Nodes {} and {} do not share an ancestor.", a, b),
            ));
        }
        if let Some(id) = next_a {
            chain_a.push(id);
            seen_a.insert(id);
            if seen_b.contains(&id) {
                break id;
            }
        }
        if let Some(id) = next_b {
            chain_b.push(id);
            seen_b.insert(id);
            if seen_a.contains(&id) {
                break id;
            }
        }
    };

    let start = anchor_below(&chain_a, ancestor)?;
    let end = anchor_below(&chain_b, ancestor)?;
    Ok(Anchors {
        ancestor,
        start,
        end,
    })
}

fn anchor_below(chain: &[NodeId], ancestor: NodeId) -> Result<NodeId, TemplateError> {
    match chain.iter().position(|id| *id == ancestor) {
        Some(position) if position > 0 => Ok(chain[position - 1]),
        _ => Err(TemplateError::internal(
            "TREE_NO_ANCHOR",
            format!(
                "Node {} is an endpoint itself, no child anchor leads to it.",
                ancestor
            ),
        )),
    }
}

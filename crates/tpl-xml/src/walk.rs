use std::collections::HashSet;

use indextree::NodeEdge;

use crate::tree::{NodeId, Tree};

/// Post-order walk: every descendant, in child order, before the node
/// itself. Leaves are therefore seen in document order.
pub fn traverse<F: FnMut(NodeId)>(tree: &Tree, node: NodeId, visit: &mut F) {
    traverse_unsettled(tree, node, &HashSet::new(), visit);
}

/// Same as [`traverse`], but subtrees rooted at a settled node are skipped
/// entirely.
pub fn traverse_unsettled<F: FnMut(NodeId)>(
    tree: &Tree,
    node: NodeId,
    settled: &HashSet<NodeId>,
    visit: &mut F,
) {
    let mut skipping: Option<NodeId> = None;
    for edge in tree.edges(node) {
        match (edge, skipping) {
            (NodeEdge::End(id), Some(skipped)) if id == skipped => skipping = None,
            (_, Some(_)) => {}
            (NodeEdge::Start(id), None) if settled.contains(&id) => skipping = Some(id),
            (NodeEdge::Start(_), None) => {}
            (NodeEdge::End(id), None) => visit(id),
        }
    }
}

pub fn post_order(tree: &Tree, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    traverse(tree, node, &mut |id| out.push(id));
    out
}

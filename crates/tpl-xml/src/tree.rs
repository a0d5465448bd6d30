use indextree::{Arena, NodeEdge, NodeError};
use tpl_core::TemplateError;

pub use indextree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// `xmlns` or `xmlns:prefix` declaration introduced on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Qualified name as written in the source, e.g. `text:p`.
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<NamespaceDecl>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
    /// Detached container for extracted or cloned sibling ranges.
    Fragment,
}

/// Document tree stored in an `indextree` arena. `prolog` and `epilog` hold
/// the source text around the root element verbatim.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<NodeKind>,
    root: NodeId,
    prolog: String,
    epilog: String,
}

impl Tree {
    pub fn new(root: ElementData) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeKind::Element(root));
        Self {
            arena,
            root,
            prolog: String::new(),
            epilog: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn prolog(&self) -> &str {
        &self.prolog
    }

    pub fn set_prolog(&mut self, prolog: impl Into<String>) {
        self.prolog = prolog.into();
    }

    pub fn epilog(&self) -> &str {
        &self.epilog
    }

    pub fn set_epilog(&mut self, epilog: impl Into<String>) {
        self.epilog = epilog.into();
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.arena.count()
    }

    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        self.arena.new_node(kind)
    }

    pub fn new_element(&mut self, data: ElementData) -> NodeId {
        self.new_node(NodeKind::Element(data))
    }

    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.new_node(NodeKind::Text(text.into()))
    }

    pub fn new_fragment(&mut self) -> NodeId {
        self.new_node(NodeKind::Fragment)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.arena[id].get()
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        self.arena[id].get_mut()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.arena).collect()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.arena[id].first_child().is_some()
    }

    /// The node itself, then each parent up to the topmost one.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena)
    }

    /// Start and end edges of every node under `id`, in document order.
    pub fn edges(&self, id: NodeId) -> impl Iterator<Item = NodeEdge> + '_ {
        id.traverse(&self.arena)
    }

    /// Leaves are nodes without element children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        !id.children(&self.arena)
            .any(|child| matches!(self.kind(child), NodeKind::Element(_)))
    }

    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TemplateError> {
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|error| invalid_move(error, child))
    }

    /// Moves `child` in front of `reference`, which must have a parent.
    pub fn insert_before(&mut self, child: NodeId, reference: NodeId) -> Result<(), TemplateError> {
        if self.parent(reference).is_none() {
            return Err(TemplateError::internal(
                "TREE_REFERENCE_DETACHED",
                format!("Node {} has no parent to insert into.", reference),
            ));
        }
        reference
            .checked_insert_before(child, &mut self.arena)
            .map_err(|error| invalid_move(error, child))
    }

    /// Copies the subtree rooted at `id` into new detached nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId, TemplateError> {
        let kind = self.kind(id).clone();
        let copy = self.new_node(kind);
        for child in self.children(id) {
            let child_copy = self.deep_clone(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Moves every child of `fragment` in front of `reference`, keeping order.
    /// Returns the moved ids.
    pub fn splice_before(
        &mut self,
        fragment: NodeId,
        reference: NodeId,
    ) -> Result<Vec<NodeId>, TemplateError> {
        let moved = self.children(fragment);
        for child in &moved {
            self.insert_before(*child, reference)?;
        }
        Ok(moved)
    }

    /// Replaces a node by a sequence of new text nodes in the same position.
    pub fn replace_text_with_parts(
        &mut self,
        id: NodeId,
        parts: Vec<String>,
    ) -> Result<Vec<NodeId>, TemplateError> {
        let mut created = Vec::with_capacity(parts.len());
        for part in parts {
            let text = self.new_text(part);
            self.insert_before(text, id)?;
            created.push(text);
        }
        self.detach(id);
        Ok(created)
    }
}

fn invalid_move(error: NodeError, node: NodeId) -> TemplateError {
    TemplateError::internal(
        "TREE_INVALID_MOVE",
        format!("Cannot move node {}: {}.", node, error),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new(ElementData::new("office:text"));
        let root = tree.root();
        let p = tree.new_element(ElementData::new("text:p"));
        let a = tree.new_text("a");
        let b = tree.new_text("b");
        tree.append_child(root, p).expect("append should pass");
        tree.append_child(p, a).expect("append should pass");
        tree.append_child(root, b).expect("append should pass");
        (tree, p, a, b)
    }

    fn texts(tree: &Tree, parent: NodeId) -> Vec<String> {
        tree.children(parent)
            .into_iter()
            .filter_map(|id| tree.text(id).map(ToString::to_string))
            .collect()
    }

    #[test]
    fn append_child_sets_parent_and_order() {
        let (tree, p, a, b) = sample();
        assert_eq!(tree.children(tree.root()), vec![p, b]);
        assert_eq!(tree.parent(a), Some(p));
        assert!(!tree.is_leaf(tree.root()));
        assert!(tree.is_leaf(p));
        assert!(!tree.has_children(a));
    }

    #[test]
    fn append_child_rejects_ancestor() {
        let (mut tree, p, _, _) = sample();
        let root = tree.root();
        let error = tree.append_child(p, root).expect_err("cycle should fail");
        assert_eq!(error.code, "TREE_INVALID_MOVE");
    }

    #[test]
    fn ancestors_start_at_node_itself() {
        let (tree, p, a, _) = sample();
        assert_eq!(tree.ancestors(a).collect::<Vec<_>>(), vec![a, p, tree.root()]);
    }

    #[test]
    fn insert_before_requires_attached_reference() {
        let (mut tree, p, _, b) = sample();
        let c = tree.new_text("c");
        tree.insert_before(c, b).expect("insert should pass");
        assert_eq!(tree.children(tree.root()), vec![p, c, b]);

        let orphan = tree.new_text("orphan");
        let error = tree
            .insert_before(c, orphan)
            .expect_err("detached reference should fail");
        assert_eq!(error.code, "TREE_REFERENCE_DETACHED");
    }

    #[test]
    fn deep_clone_copies_subtree_detached() {
        let (mut tree, p, a, _) = sample();
        let copy = tree.deep_clone(p).expect("clone should pass");
        assert_ne!(copy, p);
        assert_eq!(tree.parent(copy), None);
        let copied_children = tree.children(copy);
        assert_eq!(copied_children.len(), 1);
        assert_ne!(copied_children[0], a);
        assert_eq!(tree.text(copied_children[0]), Some("a"));

        *tree.kind_mut(copied_children[0]) = NodeKind::Text("changed".to_string());
        assert_eq!(tree.text(a), Some("a"));
    }

    #[test]
    fn detach_removes_from_parent() {
        let (mut tree, p, a, b) = sample();
        tree.detach(a);
        assert!(tree.children(p).is_empty());
        assert_eq!(tree.parent(a), None);
        tree.detach(a);
        assert_eq!(tree.children(tree.root()), vec![p, b]);
    }

    #[test]
    fn splice_before_moves_fragment_children_in_order() {
        let (mut tree, p, _, b) = sample();
        let fragment = tree.new_fragment();
        let x = tree.new_text("x");
        let y = tree.new_text("y");
        tree.append_child(fragment, x).expect("append should pass");
        tree.append_child(fragment, y).expect("append should pass");

        let moved = tree.splice_before(fragment, b).expect("splice should pass");
        assert_eq!(moved, vec![x, y]);
        assert_eq!(tree.children(tree.root()), vec![p, x, y, b]);
        assert!(!tree.has_children(fragment));
    }

    #[test]
    fn replace_text_with_parts_keeps_position() {
        let (mut tree, p, _, b) = sample();
        let parts = tree
            .replace_text_with_parts(b, vec!["1".to_string(), "2".to_string()])
            .expect("replace should pass");
        let children = tree.children(tree.root());
        assert_eq!(children[0], p);
        assert_eq!(&children[1..], parts.as_slice());
        assert_eq!(texts(&tree, tree.root()), vec!["1", "2"]);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(ElementData::new("text:p").local_name(), "p");
        assert_eq!(ElementData::new("p").local_name(), "p");
    }
}

mod ancestry;
mod parse;
mod serialize;
mod tree;
mod walk;

pub use ancestry::{common_ancestor_and_anchors, Anchors};
pub use parse::parse_document;
pub use serialize::{serialize_document, serialize_node};
pub use tree::{Attribute, ElementData, NamespaceDecl, NodeId, NodeKind, Tree};
pub use walk::{post_order, traverse, traverse_unsettled};

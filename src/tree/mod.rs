//! In-memory configuration tree and typed path queries.

pub mod errors;
pub mod query;
pub mod store;

pub use errors::TreeError;
pub use query::{Match, Path, Position, Step};
pub use store::{NodeKind, NodeRef, Side, Tree, COMMENT_LABEL, HOST_LABEL, MATCH_LABEL};

/// The tree operations the mutation engine and the annotation code rely on.
pub trait ConfigTree {
    fn root(&self) -> NodeRef;
    fn query(&self, path: &Path) -> Vec<NodeRef>;
    fn label(&self, node: NodeRef) -> Result<&str, TreeError>;
    fn value(&self, node: NodeRef) -> Result<Option<&str>, TreeError>;
    fn children(&self, node: NodeRef) -> Result<Vec<NodeRef>, TreeError>;
    fn insert(&mut self, anchor: NodeRef, label: &str, side: Side) -> Result<NodeRef, TreeError>;
    fn append_child(&mut self, parent: NodeRef, label: &str) -> Result<NodeRef, TreeError>;
    fn remove(&mut self, node: NodeRef) -> Result<(), TreeError>;
    fn remove_children(&mut self, node: NodeRef) -> Result<(), TreeError>;
    fn set_value(&mut self, node: NodeRef, text: &str) -> Result<(), TreeError>;
    fn serialize(&self) -> String;
}

impl ConfigTree for Tree {
    fn root(&self) -> NodeRef {
        Tree::root(self)
    }

    fn query(&self, path: &Path) -> Vec<NodeRef> {
        Tree::query(self, path)
    }

    fn label(&self, node: NodeRef) -> Result<&str, TreeError> {
        Tree::label(self, node)
    }

    fn value(&self, node: NodeRef) -> Result<Option<&str>, TreeError> {
        Tree::value(self, node)
    }

    fn children(&self, node: NodeRef) -> Result<Vec<NodeRef>, TreeError> {
        Tree::children(self, node)
    }

    fn insert(&mut self, anchor: NodeRef, label: &str, side: Side) -> Result<NodeRef, TreeError> {
        Tree::insert(self, anchor, label, side)
    }

    fn append_child(&mut self, parent: NodeRef, label: &str) -> Result<NodeRef, TreeError> {
        Tree::append_child(self, parent, label)
    }

    fn remove(&mut self, node: NodeRef) -> Result<(), TreeError> {
        Tree::remove(self, node)
    }

    fn remove_children(&mut self, node: NodeRef) -> Result<(), TreeError> {
        Tree::remove_children(self, node)
    }

    fn set_value(&mut self, node: NodeRef, text: &str) -> Result<(), TreeError> {
        Tree::set_value(self, node, text)
    }

    fn serialize(&self) -> String {
        Tree::serialize(self)
    }
}

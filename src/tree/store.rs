use crate::lens::{self, LensError, LensOptions};
use crate::tree::errors::TreeError;
use crate::tree::query::{Path, Step};
use std::fmt;
use tracing::trace;

pub const HOST_LABEL: &str = "Host";
pub const MATCH_LABEL: &str = "Match";
pub const COMMENT_LABEL: &str = "#comment";
pub(crate) const BLANK_LABEL: &str = "#blank";

/// Handle to a node, valid until that node is removed.
///
/// Handles are only handed out by queries and structural edits. A handle to a
/// removed node is rejected with [`TreeError::Detached`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Host,
    Match,
    Entry,
    Comment,
    Blank,
    /// Indexed value of a multi-valued entry.
    Item,
}

impl NodeKind {
    fn is_block(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Host | NodeKind::Match)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "root",
            NodeKind::Host => "host",
            NodeKind::Match => "match",
            NodeKind::Entry => "entry",
            NodeKind::Comment => "comment",
            NodeKind::Blank => "blank",
            NodeKind::Item => "item",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// How a line looked when it was read. `raw` is dropped as soon as the node
/// changes so the line gets rendered from the remaining parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) raw: Option<String>,
    pub(crate) indent: String,
    pub(crate) keyword: String,
    pub(crate) separator: String,
    pub(crate) trailing: String,
    pub(crate) eol: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) label: String,
    pub(crate) value: Option<String>,
    pub(crate) children: Vec<NodeRef>,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) layout: Layout,
    attached: bool,
}

impl Node {
    pub(crate) fn new(
        kind: NodeKind,
        label: impl Into<String>,
        value: Option<String>,
        layout: Layout,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            value,
            children: Vec::new(),
            parent: None,
            layout,
            attached: true,
        }
    }
}

/// Arena-backed configuration tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    options: LensOptions,
}

impl Tree {
    pub fn parse(text: &str) -> Result<Self, LensError> {
        lens::parse(text, LensOptions::default())
    }

    pub fn parse_with(text: &str, options: LensOptions) -> Result<Self, LensError> {
        lens::parse(text, options)
    }

    pub(crate) fn empty(options: LensOptions) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, "", None, Layout::default())],
            options,
        }
    }

    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    pub fn serialize(&self) -> String {
        lens::render(self)
    }

    /// Appends a parsed node without any of the checks done for edits.
    pub(crate) fn push_node(&mut self, parent: NodeRef, mut node: Node) -> NodeRef {
        let id = NodeRef(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn node(&self, node: NodeRef) -> Result<&Node, TreeError> {
        let found = self
            .nodes
            .get(node.0)
            .ok_or(TreeError::UnknownNode { index: node.0 })?;
        if !found.attached {
            return Err(TreeError::Detached { index: node.0 });
        }
        Ok(found)
    }

    fn node_mut(&mut self, node: NodeRef) -> Result<&mut Node, TreeError> {
        let found = self
            .nodes
            .get_mut(node.0)
            .ok_or(TreeError::UnknownNode { index: node.0 })?;
        if !found.attached {
            return Err(TreeError::Detached { index: node.0 });
        }
        Ok(found)
    }

    /// Direct access for the renderer, which only walks attached nodes.
    pub(crate) fn node_unchecked(&self, node: NodeRef) -> &Node {
        &self.nodes[node.0]
    }

    pub fn kind(&self, node: NodeRef) -> Result<NodeKind, TreeError> {
        Ok(self.node(node)?.kind)
    }

    pub fn label(&self, node: NodeRef) -> Result<&str, TreeError> {
        Ok(&self.node(node)?.label)
    }

    pub fn value(&self, node: NodeRef) -> Result<Option<&str>, TreeError> {
        Ok(self.node(node)?.value.as_deref())
    }

    /// Children in order, blank lines excluded.
    pub fn children(&self, node: NodeRef) -> Result<Vec<NodeRef>, TreeError> {
        Ok(self
            .node(node)?
            .children
            .iter()
            .copied()
            .filter(|child| self.nodes[child.0].kind != NodeKind::Blank)
            .collect())
    }

    /// Next sibling that is not a blank line.
    fn next_sibling(&self, node: NodeRef) -> Option<NodeRef> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let idx = siblings.iter().position(|sibling| *sibling == node)?;
        siblings[idx + 1..]
            .iter()
            .copied()
            .find(|sibling| self.nodes[sibling.0].kind != NodeKind::Blank)
    }

    pub fn query(&self, path: &Path) -> Vec<NodeRef> {
        let hosts = self.nodes[0].children.iter().copied().filter(|host| {
            let node = &self.nodes[host.0];
            node.kind == NodeKind::Host
                && path
                    .host_match()
                    .is_match(node.value.as_deref().unwrap_or(""))
        });

        let found: Vec<NodeRef> = match path.step() {
            Step::Block => hosts.collect(),
            Step::Entry(label) => hosts
                .flat_map(|host| self.nodes[host.0].children.iter().copied())
                .filter(|child| {
                    let node = &self.nodes[child.0];
                    node.kind == NodeKind::Entry && label.is_match(&node.label)
                })
                .collect(),
            Step::Comment { text, followed_by } => hosts
                .flat_map(|host| self.nodes[host.0].children.iter().copied())
                .filter(|child| {
                    let node = &self.nodes[child.0];
                    node.kind == NodeKind::Comment
                        && text.is_match(node.value.as_deref().unwrap_or(""))
                        && followed_by.as_ref().map_or(true, |label| {
                            self.next_sibling(*child).is_some_and(|next| {
                                let next = &self.nodes[next.0];
                                next.kind == NodeKind::Entry && label.is_match(&next.label)
                            })
                        })
                })
                .collect(),
        };

        let selected = path.position().select(found);
        trace!(%path, matches = selected.len(), "resolved path");
        selected
    }

    fn child_kind(&self, parent: NodeRef, label: &str) -> Result<NodeKind, TreeError> {
        let parent_kind = self.node(parent)?.kind;
        let kind = match parent_kind {
            NodeKind::Entry => NodeKind::Item,
            NodeKind::Root | NodeKind::Host | NodeKind::Match => {
                if label == COMMENT_LABEL {
                    NodeKind::Comment
                } else if label.eq_ignore_ascii_case(HOST_LABEL) {
                    NodeKind::Host
                } else if label.eq_ignore_ascii_case(MATCH_LABEL) {
                    NodeKind::Match
                } else {
                    NodeKind::Entry
                }
            }
            NodeKind::Comment | NodeKind::Blank | NodeKind::Item => {
                return Err(TreeError::NotABlock {
                    index: parent.0,
                    child: label.to_string(),
                })
            }
        };
        if matches!(kind, NodeKind::Host | NodeKind::Match) && parent_kind != NodeKind::Root {
            return Err(TreeError::NotABlock {
                index: parent.0,
                child: kind.to_string(),
            });
        }
        Ok(kind)
    }

    fn new_layout(&self, parent: NodeRef, kind: NodeKind, label: &str) -> Layout {
        let parent_node = &self.nodes[parent.0];
        let indent = match (kind, parent_node.kind) {
            (NodeKind::Item, _) => return Layout::default(),
            (NodeKind::Entry | NodeKind::Comment, NodeKind::Host | NodeKind::Match) => parent_node
                .children
                .iter()
                .map(|child| &self.nodes[child.0])
                .find(|child| child.kind == NodeKind::Entry)
                .map_or_else(|| self.options.indent.clone(), |entry| entry.layout.indent.clone()),
            _ => String::new(),
        };
        let keyword = match kind {
            NodeKind::Host => HOST_LABEL.to_string(),
            NodeKind::Match => MATCH_LABEL.to_string(),
            _ => label.to_string(),
        };
        Layout {
            raw: None,
            indent,
            keyword,
            separator: " ".to_string(),
            trailing: String::new(),
            eol: "\n".to_string(),
        }
    }

    fn create(&mut self, parent: NodeRef, kind: NodeKind, label: &str) -> NodeRef {
        let layout = self.new_layout(parent, kind, label);
        let label = match kind {
            NodeKind::Host => HOST_LABEL,
            NodeKind::Match => MATCH_LABEL,
            _ => label,
        };
        let mut node = Node::new(kind, label, None, layout);
        node.parent = Some(parent);
        let id = NodeRef(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Inserts a new sibling of `anchor`. A `#comment` label creates a comment.
    pub fn insert(&mut self, anchor: NodeRef, label: &str, side: Side) -> Result<NodeRef, TreeError> {
        let parent = self
            .node(anchor)?
            .parent
            .ok_or_else(|| TreeError::InvalidAnchor {
                message: "cannot insert next to the root".to_string(),
            })?;
        let kind = self.child_kind(parent, label)?;
        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == anchor)
            .ok_or(TreeError::Detached { index: anchor.0 })?;
        let id = self.create(parent, kind, label);
        let at = match side {
            Side::Before => idx,
            Side::After => idx + 1,
        };
        self.nodes[parent.0].children.insert(at, id);
        if kind == NodeKind::Item {
            self.touch(parent);
        }
        trace!(node = %id, %kind, label, anchor = %anchor, ?side, "inserted node");
        Ok(id)
    }

    /// Appends a child at the position the grammar uses for a fresh node:
    /// items go last, entries and comments go after the last non-blank line
    /// of their block, and host blocks go at the end of the file behind a
    /// separating blank line.
    pub fn append_child(&mut self, parent: NodeRef, label: &str) -> Result<NodeRef, TreeError> {
        let kind = self.child_kind(parent, label)?;
        let children = &self.nodes[parent.0].children;
        let at = match kind {
            NodeKind::Item => children.len(),
            NodeKind::Host | NodeKind::Match => {
                if !self.ends_with_blank_line() {
                    let blank = self.blank_line(parent);
                    self.nodes[parent.0].children.push(blank);
                }
                self.nodes[parent.0].children.len()
            }
            _ => {
                let mut at = children
                    .iter()
                    .position(|child| self.nodes[child.0].kind.is_block())
                    .unwrap_or(children.len());
                while at > 0 && self.nodes[children[at - 1].0].kind == NodeKind::Blank {
                    at -= 1;
                }
                at
            }
        };
        let id = self.create(parent, kind, label);
        self.nodes[parent.0].children.insert(at, id);
        if kind == NodeKind::Item {
            self.touch(parent);
        }
        trace!(node = %id, %kind, label, parent = %parent, "appended node");
        Ok(id)
    }

    fn blank_line(&mut self, parent: NodeRef) -> NodeRef {
        let layout = Layout {
            eol: "\n".to_string(),
            ..Layout::default()
        };
        let mut node = Node::new(NodeKind::Blank, BLANK_LABEL, None, layout);
        node.parent = Some(parent);
        let id = NodeRef(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// True for an empty document or one whose last line is blank.
    fn ends_with_blank_line(&self) -> bool {
        let mut current = self.root();
        loop {
            let node = &self.nodes[current.0];
            match node.children.last() {
                Some(last) if self.nodes[last.0].kind.is_block() => current = *last,
                Some(last) => return self.nodes[last.0].kind == NodeKind::Blank,
                None => return current == self.root(),
            }
        }
    }

    pub fn remove(&mut self, node: NodeRef) -> Result<(), TreeError> {
        let parent = self
            .node(node)?
            .parent
            .ok_or_else(|| TreeError::InvalidAnchor {
                message: "cannot remove the root".to_string(),
            })?;
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.detach(node);
        if self.nodes[node.0].kind == NodeKind::Item {
            self.touch(parent);
        }
        trace!(node = %node, parent = %parent, "removed node");
        Ok(())
    }

    pub fn remove_children(&mut self, node: NodeRef) -> Result<(), TreeError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            self.detach(child);
        }
        if self.nodes[node.0].kind == NodeKind::Entry {
            self.touch(node);
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeRef) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            let entry = &mut self.nodes[current.0];
            entry.attached = false;
            pending.extend(entry.children.iter().copied());
        }
    }

    pub fn set_value(&mut self, node: NodeRef, text: &str) -> Result<(), TreeError> {
        let target = self.node_mut(node)?;
        if matches!(target.kind, NodeKind::Root | NodeKind::Blank) {
            return Err(TreeError::NoValue { index: node.0 });
        }
        if target.value.as_deref() == Some(text) {
            return Ok(());
        }
        target.value = Some(text.to_string());
        self.touch(node);
        Ok(())
    }

    /// Forces the line owning `node` to be rendered from its parts.
    fn touch(&mut self, node: NodeRef) {
        let current = &mut self.nodes[node.0];
        current.layout.raw = None;
        if current.kind == NodeKind::Item {
            if let Some(parent) = current.parent {
                self.nodes[parent.0].layout.raw = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::query::{Match, Position};

    const SAMPLE: &str = "\
Host example
    User alice
    #Port 22

Host other
    User bob
";

    #[test]
    fn query_entries_by_host() {
        let tree = Tree::parse(SAMPLE).unwrap();
        let found = tree.query(&Path::entry(Match::literal("EXAMPLE"), Match::literal("user")));
        assert_eq!(found.len(), 1);
        assert_eq!(tree.value(found[0]).unwrap(), Some("alice"));
    }

    #[test]
    fn query_miss_is_empty() {
        let tree = Tree::parse(SAMPLE).unwrap();
        assert!(tree
            .query(&Path::entry(Match::literal("nowhere"), Match::Any))
            .is_empty());
    }

    #[test]
    fn removed_handle_is_rejected() {
        let mut tree = Tree::parse(SAMPLE).unwrap();
        let user = tree.query(&Path::entry(Match::literal("other"), Match::literal("User")))[0];
        tree.remove(user).unwrap();
        assert_eq!(
            tree.value(user),
            Err(TreeError::Detached {
                index: user.index()
            })
        );
        assert_eq!(tree.serialize(), "Host example\n    User alice\n    #Port 22\n\nHost other\n");
    }

    #[test]
    fn append_entry_lands_before_trailing_blank_lines() {
        let mut tree = Tree::parse(SAMPLE).unwrap();
        let host = tree.query(&Path::host(Match::literal("example")).at(Position::First))[0];
        let node = tree.append_child(host, "Port").unwrap();
        tree.set_value(node, "2222").unwrap();
        assert_eq!(
            tree.serialize(),
            "Host example\n    User alice\n    #Port 22\n    Port 2222\n\nHost other\n    User bob\n"
        );
    }

    #[test]
    fn append_host_adds_separator() {
        let mut tree = Tree::parse("Host a\n  User x\n").unwrap();
        let root = tree.root();
        let host = tree.append_child(root, HOST_LABEL).unwrap();
        tree.set_value(host, "b").unwrap();
        let entry = tree.append_child(host, "User").unwrap();
        tree.set_value(entry, "y").unwrap();
        assert_eq!(tree.serialize(), "Host a\n  User x\n\nHost b\n    User y\n");
    }

    #[test]
    fn append_global_entry_stays_before_first_host() {
        let mut tree = Tree::parse("Compression yes\n\nHost a\n  User x\n").unwrap();
        let root = tree.root();
        let entry = tree.append_child(root, "ForwardAgent").unwrap();
        tree.set_value(entry, "no").unwrap();
        assert_eq!(
            tree.serialize(),
            "Compression yes\nForwardAgent no\n\nHost a\n  User x\n"
        );
    }

    #[test]
    fn comment_followed_by_skips_blank_lines() {
        let tree = Tree::parse("Host a\n  # Port: note\n\n  Port 22\n").unwrap();
        let found = tree.query(
            &Path::comment(Match::literal("a"), Match::Any).followed_by(Match::literal("port")),
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn nested_host_is_rejected() {
        let mut tree = Tree::parse(SAMPLE).unwrap();
        let host = tree.query(&Path::host(Match::literal("example")))[0];
        assert!(matches!(
            tree.append_child(host, HOST_LABEL),
            Err(TreeError::NotABlock { .. })
        ));
    }

    #[test]
    fn unchanged_value_keeps_original_text() {
        let mut tree = Tree::parse("Host a\n  Port   22   # keep\n").unwrap();
        let port = tree.query(&Path::entry(Match::literal("a"), Match::literal("Port")))[0];
        tree.set_value(port, "22").unwrap();
        assert_eq!(tree.serialize(), "Host a\n  Port   22   # keep\n");
        tree.set_value(port, "2222").unwrap();
        assert_eq!(tree.serialize(), "Host a\n  Port   2222   # keep\n");
    }
}

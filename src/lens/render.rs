use crate::lens::directives::list_style;
use crate::tree::store::{Node, NodeKind, Tree};
use crate::tree::NodeRef;
use std::borrow::Cow;

pub(crate) fn render(tree: &Tree) -> String {
    let mut lines = Vec::new();
    collect_lines(tree, tree.root(), &mut lines);

    let mut out = String::new();
    let last = lines.len().saturating_sub(1);
    for (idx, (text, eol)) in lines.iter().enumerate() {
        out.push_str(text);
        if eol.is_empty() && idx != last {
            out.push('\n');
        } else {
            out.push_str(eol);
        }
    }
    out
}

fn collect_lines<'a>(tree: &'a Tree, block: NodeRef, lines: &mut Vec<(Cow<'a, str>, &'a str)>) {
    for child in &tree.node_unchecked(block).children {
        let node = tree.node_unchecked(*child);
        lines.push((render_line(tree, node), node.layout.eol.as_str()));
        if matches!(node.kind, NodeKind::Host | NodeKind::Match) {
            collect_lines(tree, *child, lines);
        }
    }
}

fn render_line<'a>(tree: &'a Tree, node: &'a Node) -> Cow<'a, str> {
    let layout = &node.layout;
    if let Some(raw) = &layout.raw {
        return Cow::Borrowed(raw);
    }

    match node.kind {
        NodeKind::Blank | NodeKind::Root | NodeKind::Item => Cow::Borrowed(&layout.indent),
        NodeKind::Comment => match node.value.as_deref() {
            Some(text) if !text.is_empty() => Cow::Owned(format!("{}# {text}", layout.indent)),
            _ => Cow::Owned(format!("{}#", layout.indent)),
        },
        NodeKind::Host | NodeKind::Match | NodeKind::Entry => {
            let value = value_text(tree, node);
            let keyword = if layout.keyword.is_empty() {
                node.label.as_str()
            } else {
                layout.keyword.as_str()
            };
            if value.is_empty() {
                Cow::Owned(format!("{}{keyword}{}", layout.indent, layout.trailing))
            } else {
                let separator = if layout.separator.is_empty() {
                    " "
                } else {
                    layout.separator.as_str()
                };
                Cow::Owned(format!(
                    "{}{keyword}{separator}{value}{}",
                    layout.indent, layout.trailing
                ))
            }
        }
    }
}

/// Scalar text, or the items joined the way the directive writes them.
fn value_text<'a>(tree: &'a Tree, node: &'a Node) -> Cow<'a, str> {
    if node.children.is_empty() || node.kind != NodeKind::Entry {
        return Cow::Borrowed(node.value.as_deref().unwrap_or(""));
    }
    let separator = list_style(&node.label).map_or(" ", |style| style.separator());
    let items: Vec<&str> = node
        .children
        .iter()
        .filter_map(|item| tree.node_unchecked(*item).value.as_deref())
        .collect();
    Cow::Owned(items.join(separator))
}

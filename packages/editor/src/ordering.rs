//! Canonical ordering of the `style/info` block.
//!
//! Applied when a style is loaded and when it is written out, not as a
//! constraint while editing.

use csledit_tree::{renumber_from, Node, NodeSpec, PathError};

/// Priority of `style/info` children; anything unlisted goes last.
pub const STYLE_INFO_ORDER: [&str; 13] = [
    "title",
    "id",
    r#"link rel="self""#,
    r#"link rel="template""#,
    r#"link rel="documentation""#,
    "author",
    "contributor",
    "category citation-format",
    "category field",
    "issn",
    "summary",
    "updated",
    "rights",
];

/// Sort the children of every `style/info` node by [`STYLE_INFO_ORDER`].
///
/// The sort is stable. Only identities inside the reordered subtree change,
/// counting up from the info node's position in document order. Stored
/// identities are never trusted to find the info nodes.
pub fn reorder_style_info(tree: &mut Node) -> Result<(), PathError> {
    let order = STYLE_INFO_ORDER
        .iter()
        .map(|descriptor| NodeSpec::parse(descriptor))
        .collect::<Result<Vec<_>, _>>()?;

    for (path, start) in info_nodes(tree) {
        let Some(info) = tree.descendant_mut(&path) else {
            continue;
        };

        info.children.sort_by_key(|child| rank(&order, child));
        renumber_from(info, start);
    }

    Ok(())
}

/// Child path and document-order position of every `style/info` node
fn info_nodes(tree: &Node) -> Vec<(Vec<usize>, usize)> {
    if tree.name != "style" {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut traversal = tree.traverse();
    let mut position = 0;
    while let Some(node) = traversal.next() {
        let path = traversal.child_path();
        if path.len() == 1 && node.name == "info" {
            found.push((path, position));
        }
        position += 1;
    }
    found
}

fn rank(order: &[NodeSpec], node: &Node) -> usize {
    order
        .iter()
        .rposition(|spec| spec.matches(node))
        .unwrap_or(order.len())
}

use csledit_tree::{find_by_path, locate, Node, PathError};

/// Map a macro call site to the macro it calls.
///
/// `<text macro="author"/>` resolves to the identity of
/// `<macro name="author">` under `style`, so edits aimed "inside" a call land
/// in the shared definition. Any other identity, including one that does not
/// exist, comes back unchanged.
pub fn resolve_macro_target(tree: &Node, id: usize) -> Result<usize, PathError> {
    let Some(found) = locate(tree, id) else {
        return Ok(id);
    };

    let macro_name = found.node.attr_or_empty("macro");
    if found.node.name != "text" || macro_name.is_empty() {
        return Ok(id);
    }

    let definition = find_by_path(tree, "style/macro")?
        .into_iter()
        .find(|definition| definition.attr("name") == Some(macro_name));

    Ok(definition.map_or(id, |definition| definition.node_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use csledit_tree::renumber;

    fn style() -> Node {
        let mut tree = Node::new("style")
            .with_child(Node::new("macro").with_attr("name", "title"))
            .with_child(
                Node::new("macro")
                    .with_attr("name", "author")
                    .with_child(Node::new("names")),
            )
            .with_child(
                Node::new("citation").with_child(
                    Node::new("layout")
                        .with_child(Node::new("text").with_attr("macro", "author"))
                        .with_child(Node::new("text").with_attr("macro", "missing"))
                        .with_child(Node::new("text").with_attr("variable", "title"))
                        .with_child(Node::new("label").with_attr("macro", "title")),
                ),
            );
        renumber(&mut tree);
        tree
    }

    #[test]
    fn test_call_site_resolves_to_definition() {
        let tree = style();
        // style 0, macro 1, macro 2, names 3, citation 4, layout 5, text 6
        assert_eq!(resolve_macro_target(&tree, 6).unwrap(), 2);
    }

    #[test]
    fn test_other_nodes_are_unchanged() {
        let tree = style();
        assert_eq!(resolve_macro_target(&tree, 7).unwrap(), 7, "unknown macro");
        assert_eq!(resolve_macro_target(&tree, 8).unwrap(), 8, "no macro attribute");
        assert_eq!(resolve_macro_target(&tree, 9).unwrap(), 9, "not a text node");
        assert_eq!(resolve_macro_target(&tree, 5).unwrap(), 5);
        assert_eq!(resolve_macro_target(&tree, 99).unwrap(), 99);
    }
}

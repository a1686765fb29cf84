use crate::descriptor::NodeSpec;
use crate::error::PathError;
use crate::node::Node;

/// Resolve a `/`-separated path against `root`.
///
/// The first segment has to match the root itself. Every match is returned,
/// in document order, so `style/*` yields all top-level sections.
pub fn find_by_path<'a>(root: &'a Node, path: &str) -> Result<Vec<&'a Node>, PathError> {
    let mut segments = path.split('/');
    let mut result = Vec::new();

    let leading = match segments.next() {
        Some(segment) if !segment.is_empty() => NodeSpec::parse(segment)?,
        _ => return Ok(result),
    };
    if !leading.matches(root) {
        return Ok(result);
    }

    let rest = segments.map(NodeSpec::parse).collect::<Result<Vec<_>, _>>()?;
    collect_matches(root, &rest, &mut result);
    Ok(result)
}

fn collect_matches<'a>(node: &'a Node, path: &[NodeSpec], result: &mut Vec<&'a Node>) {
    let Some((head, tail)) = path.split_first() else {
        result.push(node);
        return;
    };

    for child in node.children.iter().filter(|child| head.matches(child)) {
        collect_matches(child, tail, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::renumber;

    fn style() -> Node {
        let mut tree = Node::new("style")
            .with_child(
                Node::new("info")
                    .with_child(Node::new("title").with_text("Example"))
                    .with_child(Node::new("link").with_attr("rel", "self"))
                    .with_child(Node::new("link").with_attr("rel", "template")),
            )
            .with_child(Node::new("macro").with_attr("name", "author"))
            .with_child(Node::new("citation").with_child(Node::new("layout")));
        renumber(&mut tree);
        tree
    }

    #[test]
    fn test_nested_path() {
        let tree = style();
        let found = find_by_path(&tree, "style/info/title").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text_value.as_deref(), Some("Example"));
    }

    #[test]
    fn test_root_only() {
        let tree = style();
        let found = find_by_path(&tree, "style").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id, 0);
    }

    #[test]
    fn test_empty_or_unknown_leading_segment() {
        let tree = style();
        assert!(find_by_path(&tree, "").unwrap().is_empty());
        assert!(find_by_path(&tree, "/info").unwrap().is_empty());
        assert!(find_by_path(&tree, "locale/info").unwrap().is_empty());
    }

    #[test]
    fn test_multiple_matches_in_order() {
        let tree = style();
        let links = find_by_path(&tree, "style/info/link").unwrap();
        let rels: Vec<_> = links.iter().map(|n| n.attr("rel").unwrap()).collect();
        assert_eq!(rels, vec!["self", "template"]);
    }

    #[test]
    fn test_attribute_segment() {
        let tree = style();
        let found = find_by_path(&tree, r#"style/info/link rel="template""#).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id, 4);
    }
}

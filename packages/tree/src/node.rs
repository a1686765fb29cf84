use serde::{Deserialize, Serialize};

use crate::traversal::Traversal;

/// A single `key="value"` pair on a node.
///
/// Disabled attributes stay in the tree (so the editor can toggle them back
/// on) but are skipped when the style is written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Element of a style document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub children: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,

    /// Pre-order position in the containing tree. Only meaningful at rest.
    #[serde(default)]
    pub node_id: usize,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_value = Some(text.into());
        self
    }

    /// Value of the first attribute named `key`
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.key == key)
            .map(|attribute| attribute.value.as_str())
    }

    /// Like [`Node::attr`], but an absent attribute reads as `""`
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.key == key)
    }

    /// Overwrite the first attribute named `key`, appending one if absent.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attribute| attribute.key == key) {
            Some(attribute) => attribute.value = value,
            None => self.attributes.push(Attribute::new(key, value)),
        }
    }

    /// Walk this subtree in pre-order
    pub fn traverse(&self) -> Traversal<'_> {
        Traversal::new(self)
    }

    /// Number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        self.traverse().count()
    }

    /// Follow a child-index path down from this node
    pub fn descendant(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Position of the child whose identity matches `child`
    pub fn index_of_child(&self, child: &Node) -> Option<usize> {
        self.children
            .iter()
            .position(|candidate| candidate.node_id == child.node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup_uses_first_match() {
        let node = Node::new("text")
            .with_attr("variable", "title")
            .with_attr("variable", "container-title");

        assert_eq!(node.attr("variable"), Some("title"));
        assert_eq!(node.attr("macro"), None);
        assert_eq!(node.attr_or_empty("macro"), "");
        assert!(node.has_attr("variable"));
    }

    #[test]
    fn test_set_attr_appends_when_missing() {
        let mut node = Node::new("text").with_attr("variable", "title");
        node.set_attr("variable", "page");
        node.set_attr("prefix", " ");

        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.attr("variable"), Some("page"));
        assert_eq!(node.attr("prefix"), Some(" "));
    }

    #[test]
    fn test_descendant_follows_index_path() {
        let tree = Node::new("style").with_child(
            Node::new("citation").with_child(Node::new("layout").with_child(Node::new("text"))),
        );

        assert_eq!(tree.descendant(&[]).map(|n| n.name.as_str()), Some("style"));
        assert_eq!(tree.descendant(&[0, 0, 0]).map(|n| n.name.as_str()), Some("text"));
        assert!(tree.descendant(&[1]).is_none());
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn test_json_shape() {
        let node = Node::new("title").with_text("APA");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["name"], "title");
        assert_eq!(json["textValue"], "APA");
        assert_eq!(json["nodeId"], 0);
        assert!(json["children"].as_array().unwrap().is_empty());

        let missing_enabled: Attribute =
            serde_json::from_str(r#"{"key": "rel", "value": "self"}"#).unwrap();
        assert!(missing_enabled.enabled);
    }
}

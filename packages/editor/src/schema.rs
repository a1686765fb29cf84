//! Default content for freshly inserted nodes.

use std::collections::HashMap;

use csledit_tree::{Attribute, Node};
use serde::{Deserialize, Serialize};

/// Lookup of per-element defaults
pub trait Schema {
    fn default_attributes(&self, name: &str) -> Vec<Attribute>;

    fn default_children(&self, name: &str) -> Vec<Node>;

    /// Fill in defaults on a node that arrived without attributes or children
    fn populate(&self, mut node: Node) -> Node {
        if node.attributes.is_empty() {
            node.attributes = self.default_attributes(&node.name);
        }
        if node.children.is_empty() {
            node.children = self.default_children(&node.name);
        }
        node
    }
}

/// Schema without any defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaults;

impl Schema for NoDefaults {
    fn default_attributes(&self, _name: &str) -> Vec<Attribute> {
        Vec::new()
    }

    fn default_children(&self, _name: &str) -> Vec<Node> {
        Vec::new()
    }
}

/// Defaults read from configuration
///
/// ```json
/// {
///   "defaultAttributes": { "text": [{ "key": "value", "value": "" }] },
///   "defaultChildren": { "names": [{ "name": "name" }] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSchema {
    #[serde(default)]
    pub default_attributes: HashMap<String, Vec<Attribute>>,

    #[serde(default)]
    pub default_children: HashMap<String, Vec<Node>>,
}

impl Schema for StaticSchema {
    fn default_attributes(&self, name: &str) -> Vec<Attribute> {
        self.default_attributes.get(name).cloned().unwrap_or_default()
    }

    fn default_children(&self, name: &str) -> Vec<Node> {
        self.default_children.get(name).cloned().unwrap_or_default()
    }
}

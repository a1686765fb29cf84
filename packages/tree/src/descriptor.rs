//! Node descriptors: `name`, `name attr`, `name attr=` or `name attr="value"`.

use regex::Regex;

use crate::error::PathError;
use crate::node::Node;

/// Matcher for a node name. `*` matches any run of characters; everything
/// else is literal.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Exact(String),
    Wildcard(Regex),
}

impl NamePattern {
    pub fn parse(pattern: &str) -> Result<Self, PathError> {
        if !pattern.contains('*') {
            return Ok(NamePattern::Exact(pattern.to_string()));
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        Regex::new(&format!("^{}$", body))
            .map(NamePattern::Wildcard)
            .map_err(|e| PathError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(expected) => expected == name,
            NamePattern::Wildcard(regex) => regex.is_match(name),
        }
    }
}

/// A node descriptor as used in paths and ordering lists.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: NamePattern,
    /// Attribute the node must carry
    pub attribute: Option<String>,
    /// Required value of `attribute`; `None` accepts any value
    pub value: Option<String>,
}

impl NodeSpec {
    pub fn parse(descriptor: &str) -> Result<Self, PathError> {
        let mut parts = descriptor.splitn(2, ' ');
        let name = NamePattern::parse(parts.next().unwrap_or(""))?;

        let (attribute, value) = match parts.next().map(str::trim) {
            None | Some("") => (None, None),
            Some(filter) => match filter.split_once('=') {
                None => (Some(filter.to_string()), None),
                Some((key, raw)) => {
                    let value = raw.replace('"', "");
                    // `attr=` with nothing after it only requires presence
                    let value = if raw.is_empty() { None } else { Some(value) };
                    (Some(key.to_string()), value)
                }
            },
        };

        Ok(Self {
            name,
            attribute,
            value,
        })
    }

    pub fn matches(&self, node: &Node) -> bool {
        if !self.name.matches(&node.name) {
            return false;
        }

        let Some(attribute) = &self.attribute else {
            return true;
        };

        match (node.attr(attribute), &self.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        }
    }
}

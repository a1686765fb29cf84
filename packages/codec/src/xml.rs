use std::borrow::Cow;

use csledit_tree::{renumber, Attribute, Node};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::{MarkupCodec, ParseError};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// XML codec backed by `quick-xml`
#[derive(Debug, Clone)]
pub struct XmlCodec {
    /// Spaces per nesting level on output
    pub indent: usize,
}

impl Default for XmlCodec {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl XmlCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkupCodec for XmlCodec {
    fn parse(&self, markup: &str) -> Result<Node, ParseError> {
        let mut reader = Reader::from_str(markup);

        let mut open: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            let event = reader.read_event().map_err(|e| ParseError::Malformed {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(start) => {
                    let node = element(&start, position)?;
                    if root.is_some() {
                        return Err(ParseError::TrailingElement(node.name));
                    }
                    open.push(node);
                }
                Event::Empty(start) => {
                    let node = element(&start, position)?;
                    close(node, &mut open, &mut root)?;
                }
                Event::End(_) => {
                    // quick-xml has already checked that the names pair up
                    if let Some(node) = open.pop() {
                        close(node, &mut open, &mut root)?;
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| ParseError::Malformed {
                        position,
                        message: e.to_string(),
                    })?;
                    // Indentation between elements
                    if !text.trim().is_empty() {
                        append_text(&mut open, &text);
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    append_text(&mut open, &text);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(ParseError::Unclosed(unclosed.name));
        }

        let mut tree = root.ok_or(ParseError::NoRootElement)?;
        let count = renumber(&mut tree);
        debug!("Parsed <{}> with {} nodes", tree.name, count);
        Ok(tree)
    }

    fn serialize(&self, tree: &Node, comment: Option<&str>) -> String {
        let mut out = String::new();
        out.push_str(DECLARATION);
        out.push('\n');

        if let Some(comment) = comment {
            // `--` may not appear inside an XML comment
            out.push_str(&format!("<!-- {} -->\n", comment.replace("--", "- -")));
        }

        self.write_node(tree, 0, &mut out);
        out
    }
}

impl XmlCodec {
    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        out.push_str(&" ".repeat(self.indent * depth));
        self.write_element(node, depth, out);
    }

    fn write_element(&self, node: &Node, depth: usize, out: &mut String) {
        let pad = " ".repeat(self.indent * depth);
        out.push('<');
        out.push_str(&node.name);

        for attribute in node.attributes.iter().filter(|a| a.enabled) {
            out.push(' ');
            out.push_str(&attribute.key);
            out.push_str("=\"");
            out.push_str(&escape(attribute.value.as_str()));
            out.push('"');
        }

        let text = node.text_value.as_deref().filter(|text| !text.is_empty());

        match (text, node.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                out.push('>');
                out.push_str(&escape(text));
                out.push_str("</");
                out.push_str(&node.name);
                out.push_str(">\n");
            }
            (text, false) => {
                out.push('>');
                let mut children = node.children.iter();
                // Mixed content: no whitespace may follow the text
                if let Some(text) = text {
                    out.push_str(&escape(text));
                    if let Some(first) = children.next() {
                        self.write_element(first, depth + 1, out);
                    }
                } else {
                    out.push('\n');
                }
                for child in children {
                    self.write_node(child, depth + 1, out);
                }
                out.push_str(&pad);
                out.push_str("</");
                out.push_str(&node.name);
                out.push_str(">\n");
            }
        }
    }
}

fn element(start: &BytesStart<'_>, position: u64) -> Result<Node, ParseError> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ParseError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attribute.unescape_value().map_err(|e| ParseError::Malformed {
            position,
            message: e.to_string(),
        })?;
        node.attributes.push(Attribute::new(key, value.into_owned()));
    }

    Ok(node)
}

fn close(node: Node, open: &mut [Node], root: &mut Option<Node>) -> Result<(), ParseError> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(ParseError::TrailingElement(node.name)),
    }
}

fn append_text(open: &mut [Node], text: &str) {
    // Text outside the root element carries no meaning for a style
    if let Some(node) = open.last_mut() {
        node.text_value
            .get_or_insert_with(String::new)
            .push_str(text);
    }
}

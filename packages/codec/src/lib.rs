//! # CSL Markup Codec
//!
//! Converts between CSL XML text and the [`csledit_tree::Node`] tree.
//!
//! The editor only depends on the [`MarkupCodec`] trait; [`XmlCodec`] is the
//! implementation used by default.
//!
//! ## Mapping
//!
//! ```text
//! <text variable="title" prefix=" "/>   →  Node { name: "text", attributes: [variable, prefix] }
//! <title>Example</title>                 →  Node { name: "title", text_value: Some("Example") }
//! <!-- comment -->, <?pi?>               →  dropped
//! ```
//!
//! Parsed trees come back with identities already assigned.

mod error;
mod xml;

pub use error::ParseError;
pub use xml::XmlCodec;

use csledit_tree::Node;

/// Text form of a style document
pub trait MarkupCodec {
    /// Parse markup into a numbered tree
    fn parse(&self, markup: &str) -> Result<Node, ParseError>;

    /// Write a tree back out, optionally with a leading comment
    fn serialize(&self, tree: &Node, comment: Option<&str>) -> String;
}

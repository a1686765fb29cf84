use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use csledit_editor::{Document, EditorOptions, Node};

use super::open;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// CSL style to read
    pub file: PathBuf,

    /// Slash-separated path, e.g. `style/citation/layout` or `style/*`
    pub path: String,
}

/// One query match
#[derive(Debug, PartialEq)]
struct Match {
    id: usize,
    path: String,
    summary: String,
}

pub fn query(args: QueryArgs, options: EditorOptions) -> Result<()> {
    let doc = open(&args.file, options)?;
    let matches = find(&doc, &args.path)?;

    if matches.is_empty() {
        eprintln!("{} No nodes match {}", "⚠️".yellow(), args.path.bright_white());
        return Ok(());
    }

    for found in matches {
        println!(
            "{:>4}  {}  {}",
            found.id.to_string().dimmed(),
            found.path.bright_blue(),
            found.summary
        );
    }
    Ok(())
}

fn find(doc: &Document, path: &str) -> Result<Vec<Match>> {
    let mut matches = Vec::new();
    for node in doc.get_nodes_from_path(path)? {
        matches.push(Match {
            id: node.node_id,
            path: doc.get_node_path(node.node_id)?.unwrap_or_default(),
            summary: summary(&node),
        });
    }
    Ok(matches)
}

/// `<name key="value" ...>` with the text value, if any, after it
pub(crate) fn summary(node: &Node) -> String {
    let mut out = format!("<{}", node.name);
    for attribute in node.attributes.iter().filter(|a| a.enabled) {
        out.push_str(&format!(" {}=\"{}\"", attribute.key, attribute.value));
    }
    out.push('>');

    if let Some(text) = node.text_value.as_deref().filter(|t| !t.is_empty()) {
        out.push(' ');
        out.push_str(text);
    }
    out
}

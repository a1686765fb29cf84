use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use csledit_editor::{EditorOptions, Node};

use super::open;
use super::query::summary;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// CSL style to read
    pub file: PathBuf,
}

pub fn tree(args: TreeArgs, options: EditorOptions) -> Result<()> {
    let doc = open(&args.file, options)?;
    let root = doc.get()?;

    for (id, depth, line) in outline(&root) {
        println!("{:>4}  {}{}", id.to_string().dimmed(), "  ".repeat(depth), line);
    }
    println!();
    println!("{} nodes", root.count().to_string().bold());
    Ok(())
}

/// `(id, depth, summary)` for every node in document order
fn outline(root: &Node) -> Vec<(usize, usize, String)> {
    let mut lines = Vec::new();
    let mut traversal = root.traverse();
    while let Some(node) = traversal.next() {
        let depth = traversal.child_path().len();
        lines.push((node.node_id, depth, summary(node)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::style_file;

    #[test]
    fn test_outline_depths() {
        let dir = tempfile::tempdir().unwrap();
        let doc = open(&style_file(dir.path()), EditorOptions::default()).unwrap();
        let lines = outline(&doc.get().unwrap());

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], (0, 0, r#"<style class="in-text" version="1.0">"#.to_string()));
        assert_eq!(lines[2], (2, 2, "<title> Example Style".to_string()));
        assert_eq!(lines[8], (8, 3, r#"<text macro="author">"#.to_string()));
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use csledit_editor::EditorOptions;

use super::{open, write_output};

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// CSL style to read
    pub file: PathBuf,

    /// Comment to place after the XML declaration
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn normalize(args: NormalizeArgs, options: EditorOptions) -> Result<()> {
    let markup = normalized(&args, options)?;
    write_output(args.output.as_deref(), &markup)?;

    if let Some(output) = &args.output {
        eprintln!("  {} {} → {}", "✓".green(), args.file.display(), output.display());
    }
    Ok(())
}

fn normalized(args: &NormalizeArgs, options: EditorOptions) -> Result<String> {
    let doc = open(&args.file, options)?;
    Ok(doc.get_markup(args.comment.as_deref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::style_file;

    #[test]
    fn test_normalize_orders_info_and_adds_comment() {
        let dir = tempfile::tempdir().unwrap();
        let args = NormalizeArgs {
            file: style_file(dir.path()),
            comment: Some("normalized".to_string()),
            output: None,
        };

        let markup = normalized(&args, EditorOptions::default()).unwrap();
        assert!(markup.contains("<!-- normalized -->"));

        let title = markup.find("<title>").unwrap();
        let id = markup.find("<id>").unwrap();
        assert!(title < id);
    }

    #[test]
    fn test_normalize_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out/normalized.csl");
        let args = NormalizeArgs {
            file: style_file(dir.path()),
            comment: None,
            output: Some(output.clone()),
        };

        normalize(args, EditorOptions::default()).unwrap();
        let written = std::fs::read_to_string(output).unwrap();
        assert!(written.starts_with("<?xml"));
    }
}

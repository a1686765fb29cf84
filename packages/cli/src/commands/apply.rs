use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use csledit_editor::{Command, Document, EditorOptions, UndoStack};
use tracing::info;

use super::{open, write_output};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// CSL style to edit
    pub file: PathBuf,

    /// JSON array of `{"command": ..., "args": [...]}` objects
    pub commands: PathBuf,

    /// Write the edited style here; without it nothing is written
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Comment to place after the XML declaration
    #[arg(short, long)]
    pub comment: Option<String>,
}

pub fn apply(args: ApplyArgs, options: EditorOptions) -> Result<()> {
    let mut doc = open(&args.file, options)?;
    let commands = read_commands(&args)?;

    let inverses = run(&mut doc, commands)?;
    println!("{}", serde_json::to_string_pretty(&inverses)?);

    if let Some(output) = &args.output {
        let markup = doc.get_markup(args.comment.as_deref())?;
        write_output(Some(output), &markup)?;
        eprintln!("  {} {} → {}", "✓".green(), args.file.display(), output.display());
    }
    Ok(())
}

fn read_commands(args: &ApplyArgs) -> Result<Vec<Command>> {
    let content = fs::read_to_string(&args.commands)
        .with_context(|| format!("Cannot read {}", args.commands.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid commands in {}", args.commands.display()))
}

/// Apply `commands` as one batch. Returns the inverses in the order they
/// must be applied to undo the batch.
fn run(doc: &mut Document, commands: Vec<Command>) -> Result<Vec<Command>> {
    let mut stack = UndoStack::new();
    let count = commands.len();

    stack.begin_batch();
    let mut inverses = Vec::with_capacity(count);
    for (index, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let inverse = stack
            .execute(command, doc)
            .with_context(|| format!("Command {} ({}) failed", index + 1, name))?;
        inverses.push(inverse);
    }
    stack.end_batch();

    info!("Applied {} commands", count);
    inverses.reverse();
    Ok(inverses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::style_file;

    fn commands(json: &str) -> Vec<Command> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_run_returns_inverses_in_undo_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = open(&style_file(dir.path()), EditorOptions::default()).unwrap();
        let original = doc.get().unwrap();

        let inverses = run(
            &mut doc,
            commands(
                r#"[
                    {"command": "addNode", "args": [7, "last", {"name": "text", "attributes": [{"key": "variable", "value": "title"}], "children": [], "nodeId": 0}]},
                    {"command": "deleteNode", "args": [4]}
                ]"#,
            ),
        )
        .unwrap();

        assert_eq!(inverses.len(), 2);
        assert_eq!(inverses[0].name(), "addNode");
        assert_eq!(inverses[1].name(), "deleteNode");

        for inverse in inverses {
            doc.apply(inverse).unwrap();
        }
        assert_eq!(doc.get().unwrap(), original);
    }

    #[test]
    fn test_failing_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = open(&style_file(dir.path()), EditorOptions::default()).unwrap();

        let error = run(&mut doc, commands(r#"[{"command": "deleteNode", "args": [0]}]"#))
            .unwrap_err();
        assert!(error.to_string().starts_with("Command 1 (deleteNode) failed"));
    }

    #[test]
    fn test_apply_writes_edited_style() {
        let dir = tempfile::tempdir().unwrap();
        let commands = dir.path().join("commands.json");
        fs::write(&commands, r#"[{"command": "deleteNode", "args": [4]}]"#).unwrap();
        let output = dir.path().join("edited.csl");

        let args = ApplyArgs {
            file: style_file(dir.path()),
            commands,
            output: Some(output.clone()),
            comment: None,
        };
        apply(args, EditorOptions::default()).unwrap();

        let edited = fs::read_to_string(output).unwrap();
        assert!(!edited.contains("<macro"));
        assert!(edited.contains("<layout delimiter=\"; \">"));
    }
}

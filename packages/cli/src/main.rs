mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, normalize, query, tree, ApplyArgs, NormalizeArgs, QueryArgs, TreeArgs};
use csledit_editor::{EditorError, EditorOptions};

/// csledit - structural editor for CSL citation styles
#[derive(Parser, Debug)]
#[command(name = "csledit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding csledit.config.json
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a style and write it back out in canonical form
    Normalize(NormalizeArgs),

    /// List the nodes matching a path such as `style/macro` or `style/*/layout`
    Query(QueryArgs),

    /// Print the node tree with identities
    Tree(TreeArgs),

    /// Apply a JSON list of edit commands and print their inverses
    Apply(ApplyArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = EditorOptions::load(&cli.config)
        .map_err(anyhow::Error::from)
        .and_then(|options| match cli.command {
            Command::Normalize(args) => normalize(args, options),
            Command::Query(args) => query(args, options),
            Command::Tree(args) => tree(args, options),
            Command::Apply(args) => apply(args, options),
        });

    if let Err(err) = result {
        eprintln!();
        match err.downcast_ref::<EditorError>().and_then(EditorError::style_error) {
            Some(style_error) => eprintln!("{} {}", "Style error:".yellow().bold(), style_error),
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        eprintln!();
        std::process::exit(1);
    }
}

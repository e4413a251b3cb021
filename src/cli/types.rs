//! CLI type definitions
//!
//! Clap structures for the `docent` command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{ask::AskArgs, chat::ChatArgs, ingest::IngestArgs, status::StatusArgs};

#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(about = "Docent - ask questions about a reference document", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .docent/
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a document, chunk it, embed it and write it to the index
    Ingest(IngestArgs),

    /// Answer one question from the indexed document
    Ask(AskArgs),

    /// Interactive question-and-answer session
    Chat(ChatArgs),

    /// Show the index and per-namespace record counts
    Status(StatusArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "docent",
            "ask",
            "What is the minimum age?",
            "--json",
            "--context-only",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.question, "What is the minimum age?");
                assert!(args.context_only);
            }
            other => panic!("expected ask, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ingest_without_path() {
        let cli = Cli::try_parse_from(["docent", "ingest", "--namespace", "staging"]).unwrap();
        match cli.command {
            Commands::Ingest(args) => {
                assert!(args.path.is_none());
                assert_eq!(args.namespace.as_deref(), Some("staging"));
            }
            other => panic!("expected ingest, got {other:?}"),
        }
    }
}

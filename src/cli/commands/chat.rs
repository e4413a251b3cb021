//! Implementation of the `docent chat` command.
//!
//! A line-oriented REPL over one [`ChatSession`]. The transcript is redrawn
//! after every answer; a failed answer leaves it untouched.

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Term};
use tracing::warn;

use super::prompt_line;
use crate::cli::output::progress::{create_spinner_with_message, ProgressBarExt};
use crate::cli::service;
use crate::domain::models::{ApiKey, ChatSession, Config, Role, Turn};
use crate::infrastructure::config::ConfigLoader;

const KEY_REQUIRED: &str = "An OpenAI API key is required to answer questions.";
const HELP: &str = "Commands: /key to enter an API key, /clear to reset the transcript, /quit to leave";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Number of chunks to retrieve per question
    #[arg(long)]
    pub top_k: Option<usize>,
}

pub async fn execute(args: ChatArgs, config: &Config, _json_mode: bool) -> Result<()> {
    let term = Term::stderr();
    let mut config = config.clone();
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
        ConfigLoader::validate(&config)?;
    }

    let mut session = ChatSession::new();
    if config.llm.api_key.is_none() || config.embedding.api_key.is_none() {
        println!("{}", style(KEY_REQUIRED).yellow());
        let Some(key) = next_key(|| read_api_key(&term))? else {
            return Ok(());
        };
        if config.llm.api_key.is_none() {
            session.set_api_key(key.clone());
        }
        if config.embedding.api_key.is_none() {
            config.embedding.api_key = Some(key);
        }
    }

    let pipeline = service::query_pipeline(&config).await?;
    println!(
        "Ask a question about the document indexed in {}.\n{HELP}",
        pipeline.coordinate()
    );

    loop {
        let Some(line) = prompt_line(&format!("{} ", style("you>").cyan().bold()))? else {
            break;
        };
        let question = line.trim();

        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{HELP}");
                continue;
            }
            "/clear" => {
                session.clear();
                println!("Transcript cleared.");
                continue;
            }
            "/key" => {
                if let KeyEntry::Key(key) = read_api_key(&term)? {
                    session.set_api_key(key);
                }
                continue;
            }
            _ => {}
        }

        if !pipeline.has_credential(&session) {
            println!("{}", style(KEY_REQUIRED).yellow());
            match read_api_key(&term)? {
                KeyEntry::Key(key) => session.set_api_key(key),
                KeyEntry::Empty => continue,
                KeyEntry::Closed => break,
            }
        }

        let spinner = create_spinner_with_message("Generating answer...");
        match pipeline.answer(&mut session, question).await {
            Ok(result) => {
                spinner.finish_and_clear();
                redraw(&Term::stdout(), &session)?;
                if !result.context.is_empty() {
                    let pages: Vec<String> = result
                        .context
                        .source_pages()
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    println!("{}", style(format!("Sources: page {}", pages.join(", "))).dim());
                }
            }
            Err(err) => {
                spinner.finish_error("Answer generation failed");
                warn!(error = %err, "answer generation failed");
                println!("{}", style(format!("answer generation failed: {err}")).red());
            }
        }
    }

    Ok(())
}

/// Ask for a key without echoing it; a blank entry yields `None`
/// One answer to the API key prompt
#[derive(Debug)]
enum KeyEntry {
    Key(ApiKey),
    Empty,
    Closed,
}

impl KeyEntry {
    fn from_line(line: Option<String>) -> Self {
        match line {
            Some(line) => ApiKey::new(line).map_or(Self::Empty, Self::Key),
            None => Self::Closed,
        }
    }
}

fn read_api_key(term: &Term) -> Result<KeyEntry> {
    let line = if term.is_term() {
        term.write_str("OpenAI API key: ")
            .context("Failed to write prompt")?;
        Some(term.read_secure_line().context("Failed to read API key")?)
    } else {
        prompt_line("OpenAI API key: ")?
    };
    Ok(KeyEntry::from_line(line))
}

/// Ask until a key is entered; `None` once input is closed
fn next_key(mut read: impl FnMut() -> Result<KeyEntry>) -> Result<Option<ApiKey>> {
    loop {
        match read()? {
            KeyEntry::Key(key) => return Ok(Some(key)),
            KeyEntry::Empty => println!("{}", style(KEY_REQUIRED).yellow()),
            KeyEntry::Closed => return Ok(None),
        }
    }
}

fn redraw(term: &Term, session: &ChatSession) -> Result<()> {
    if term.is_term() {
        term.clear_screen().context("Failed to clear screen")?;
    }
    println!("{}", format_transcript(session.turns()));
    Ok(())
}

fn format_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let label = match turn.role {
                Role::User => style(turn.role.label()).cyan().bold(),
                Role::Assistant => style(turn.role.label()).green().bold(),
            };
            format!("{label}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

//! Implementation of the `docent ask` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::progress::{create_spinner_with_message, ProgressBarExt};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::cli::service;
use crate::domain::models::{ApiKey, ChatSession, Config, IndexCoordinate, RetrievedContext};
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// LLM API key for this request (overrides OPENAI_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Number of chunks to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Only show the retrieved chunks, without calling the LLM
    #[arg(long)]
    pub context_only: bool,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub question: String,
    pub coordinate: IndexCoordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub source_pages: Vec<usize>,
    pub context: RetrievedContext,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        match &self.answer {
            Some(answer) => lines.push(answer.clone()),
            None if self.context.is_empty() => {}
            None => lines.push(TableFormatter::new().format_context(&self.context)),
        }

        if self.context.is_empty() {
            lines.push(format!(
                "No indexed chunks were found in {}. Run `docent ingest` first.",
                self.coordinate
            ));
        } else if self.answer.is_some() {
            let pages: Vec<String> = self.source_pages.iter().map(ToString::to_string).collect();
            lines.push(format!("\nSources: page {}", pages.join(", ")));
        }

        lines.join("\n")
    }
}

pub async fn execute(args: AskArgs, config: &Config, json_mode: bool) -> Result<()> {
    let session_key = args.api_key.and_then(ApiKey::new);

    let mut config = config.clone();
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
        ConfigLoader::validate(&config)?;
    }
    // A key given on the command line also serves the embedding call
    if config.embedding.api_key.is_none() {
        config.embedding.api_key.clone_from(&session_key);
    }

    let pipeline = service::query_pipeline(&config).await?;
    let coordinate = pipeline.coordinate().clone();

    if args.context_only {
        let context = pipeline.search(&args.question).await?;
        output(
            &AskOutput {
                question: args.question,
                coordinate,
                answer: None,
                model: None,
                source_pages: context.source_pages(),
                context,
            },
            json_mode,
        );
        return Ok(());
    }

    let mut session = ChatSession::new().with_api_key(session_key);
    let spinner = create_spinner_with_message("Generating answer...");
    let result = match pipeline.answer(&mut session, &args.question).await {
        Ok(result) => {
            spinner.finish_and_clear();
            result
        }
        Err(err) => {
            spinner.finish_error("Answer generation failed");
            return Err(err.into());
        }
    };

    output(
        &AskOutput {
            question: args.question,
            coordinate,
            answer: Some(result.answer),
            model: Some(result.model),
            source_pages: result.context.source_pages(),
            context: result.context,
        },
        json_mode,
    );
    Ok(())
}

//! Implementation of the `docent status` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::cli::service;
use crate::domain::models::{Config, IndexDescription};
use crate::domain::ports::NamespaceStats;

#[derive(Args, Debug)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub index_name: String,
    pub namespace: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexDescription>,
    pub namespaces: Vec<NamespaceStats>,
}

impl StatusOutput {
    /// Records in the configured namespace
    pub fn record_count(&self) -> usize {
        self.namespaces
            .iter()
            .find(|stats| stats.namespace == self.namespace)
            .map_or(0, |stats| stats.record_count)
    }
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let Some(description) = &self.index else {
            return format!(
                "Index '{}' does not exist yet ({} provider). Run `docent ingest` to create it.",
                self.index_name, self.provider
            );
        };

        let mut lines = vec![TableFormatter::new().format_status(
            description,
            &self.namespaces,
            &self.namespace,
        )];
        lines.push(format!(
            "Namespace '{}' holds {} record(s).",
            self.namespace,
            self.record_count()
        ));
        lines.join("\n")
    }
}

pub async fn execute(_args: StatusArgs, config: &Config, json_mode: bool) -> Result<()> {
    let coordinate = config.index.coordinate()?;
    let index = service::open_index(config).await?;

    let description = index.describe_index(&coordinate.index_name).await?;
    let namespaces = match description {
        Some(_) => index.namespace_stats(&coordinate.index_name).await?,
        None => Vec::new(),
    };

    output(
        &StatusOutput {
            index_name: coordinate.index_name,
            namespace: coordinate.namespace,
            provider: index.name().to_string(),
            index: description,
            namespaces,
        },
        json_mode,
    );
    Ok(())
}

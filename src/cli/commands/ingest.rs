//! Implementation of the `docent ingest` command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::prompt_line;
use crate::adapters::loaders::loader_for;
use crate::cli::output::progress::{create_spinner_with_message, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::cli::service;
use crate::domain::models::{document_id_from_stem, Config};
use crate::services::IngestionReport;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Source document; prompted for when omitted
    pub path: Option<PathBuf>,

    /// Document id used in chunk ids (defaults to the file stem)
    #[arg(long)]
    pub document_id: Option<String>,

    /// Write to this namespace instead of the configured one
    #[arg(long)]
    pub namespace: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub source: String,
    #[serde(flatten)]
    pub report: IngestionReport,
}

impl CommandOutput for IngestOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut lines = vec![format!(
            "Ingested {} into {}",
            self.source, report.coordinate
        )];
        lines.push(format!("  Pages:   {}", report.pages));
        if !report.skipped_pages.is_empty() {
            let skipped: Vec<String> = report.skipped_pages.iter().map(ToString::to_string).collect();
            lines.push(format!("  Skipped: {} (no text)", skipped.join(", ")));
        }
        lines.push(format!("  Chunks:  {}", report.chunks));
        if report.oversized_chunks > 0 {
            lines.push(format!(
                "  Oversized chunks: {} (no separator could split them)",
                report.oversized_chunks
            ));
        }
        lines.push(format!(
            "  Records upserted: {} in {} batch{}",
            report.records_upserted,
            report.batches,
            if report.batches == 1 { "" } else { "es" }
        ));
        lines.join("\n")
    }
}

pub async fn execute(args: IngestArgs, config: &Config, json_mode: bool) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => match prompt_line("Path to the source document: ")? {
            Some(line) if !line.trim().is_empty() => PathBuf::from(line.trim()),
            _ => bail!("No source document given"),
        },
    };

    let pipeline = service::ingestion_pipeline(config, args.namespace.as_deref()).await?;

    let document_id = args
        .document_id
        .unwrap_or_else(|| default_document_id(&path));
    let document = loader_for(&path).load(&path, &document_id).await?;

    let spinner = create_spinner_with_message(format!(
        "Indexing {} page(s) into {}",
        document.page_count(),
        pipeline.coordinate()
    ));
    let report = match pipeline.run(&document).await {
        Ok(report) => {
            spinner.finish_success(format!("{} records written", report.records_upserted));
            report
        }
        Err(err) => {
            spinner.finish_error("Ingestion failed");
            return Err(err.into());
        }
    };

    output(
        &IngestOutput {
            source: path.display().to_string(),
            report,
        },
        json_mode,
    );
    Ok(())
}

fn default_document_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    document_id_from_stem(&stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::IndexCoordinate;

    #[test]
    fn test_default_document_id_uses_stem() {
        let id = default_document_id(Path::new("/data/terms_of_service.txt"));
        assert_eq!(id, document_id_from_stem("terms_of_service"));
    }

    #[test]
    fn test_human_output_reports_counts() {
        let out = IngestOutput {
            source: "tos.txt".to_string(),
            report: IngestionReport {
                document_id: "tos".to_string(),
                coordinate: IndexCoordinate::new("tos-index", "rag-demo-app"),
                pages: 3,
                skipped_pages: vec![2],
                chunks: 7,
                oversized_chunks: 0,
                records_upserted: 7,
                batches: 1,
            },
        };
        let human = out.to_human();
        assert!(human.contains("Ingested tos.txt"));
        assert!(human.contains("Skipped: 2"));
        assert!(human.contains("7 in 1 batch"));
        assert!(!human.contains("batches"));

        let json = out.to_json();
        assert_eq!(json["records_upserted"], 7);
        assert_eq!(json["source"], "tos.txt");
    }
}

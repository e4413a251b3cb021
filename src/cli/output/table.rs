//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::env;

use super::{single_line, truncate};
use crate::domain::models::{IndexDescription, RetrievedContext};
use crate::domain::ports::NamespaceStats;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub const fn new() -> Self {
        Self { max_width: None }
    }

    pub const fn with_width(max_width: u16) -> Self {
        Self {
            max_width: Some(max_width),
        }
    }

    /// Retrieved chunks in rank order
    pub fn format_context(&self, context: &RetrievedContext) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["#", "Page", "Score", "Chunk"]));

        for (rank, record) in context.records().iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1).set_alignment(CellAlignment::Right),
                Cell::new(record.metadata.source_page).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.3}", record.score)).set_alignment(CellAlignment::Right),
                Cell::new(truncate(&single_line(&record.metadata.text), 80)),
            ]);
        }

        table.to_string()
    }

    /// Index description followed by one row per namespace
    pub fn format_status(
        &self,
        description: &IndexDescription,
        namespaces: &[NamespaceStats],
        configured_namespace: &str,
    ) -> String {
        let mut index_table = self.create_base_table();
        index_table.set_header(header(&["Index", "Dimension", "Metric", "Ready", "Host"]));
        index_table.add_row(vec![
            Cell::new(&description.name),
            Cell::new(description.dimension),
            Cell::new(description.metric),
            Cell::new(if description.ready { "yes" } else { "no" }),
            Cell::new(description.host.as_deref().unwrap_or("-")),
        ]);

        let mut namespace_table = self.create_base_table();
        namespace_table.set_header(header(&["Namespace", "Records"]));
        for stats in namespaces {
            let mut name = Cell::new(&stats.namespace);
            if stats.namespace == configured_namespace {
                name = name.add_attribute(Attribute::Bold);
            }
            namespace_table.add_row(vec![
                name,
                Cell::new(stats.record_count).set_alignment(CellAlignment::Right),
            ]);
        }

        format!("{index_table}\n{namespace_table}")
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if !supports_color() {
            table.force_no_tty();
        }
        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{IndexMetric, RecordMetadata, ScoredRecord};

    #[test]
    fn test_format_context_lists_pages() {
        let context = RetrievedContext::new(vec![ScoredRecord {
            id: "tos:page:4:offset:0".to_string(),
            score: 0.912,
            metadata: RecordMetadata {
                text: "Users must be\n13 years or older.".to_string(),
                source_page: 4,
                source: None,
            },
        }]);
        let rendered = TableFormatter::with_width(120).format_context(&context);
        assert!(rendered.contains("0.912"));
        assert!(rendered.contains("Users must be 13 years or older."));
    }

    #[test]
    fn test_format_status() {
        let description = IndexDescription {
            name: "tos-index".to_string(),
            dimension: 1536,
            metric: IndexMetric::Cosine,
            host: None,
            ready: true,
        };
        let rendered = TableFormatter::with_width(120).format_status(
            &description,
            &[NamespaceStats {
                namespace: "rag-demo-app".to_string(),
                record_count: 42,
            }],
            "rag-demo-app",
        );
        assert!(rendered.contains("tos-index"));
        assert!(rendered.contains("1536"));
        assert!(rendered.contains("42"));
    }
}

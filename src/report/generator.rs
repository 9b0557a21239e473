//! Summary report generation.
//!
//! This module turns the summary table into Markdown, HTML or JSON
//! documents.

use crate::models::ColumnSpec;
use crate::report::format::reformat_scientific;
use crate::report::table::{Cell, RemovalMode, SummaryTable};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Metadata about the tally run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of parcels in the payload.
    pub parcels_loaded: usize,
    /// Parcels selected when the report was generated.
    pub parcels_selected: Vec<String>,
    /// Number of toggle events replayed.
    pub events_applied: usize,
    /// Number of municipality rows shown.
    pub municipalities: usize,
}

/// A rendered row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub municipality: String,
    pub cells: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fading: bool,
}

/// The complete summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub metadata: ReportMetadata,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<ReportRow>,
    /// "Selected Total" footer, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_total: Option<Vec<String>>,
    /// Fade duration of fading rows, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_ms: Option<u64>,
}

impl TableReport {
    /// Snapshot the table's displayed state.
    pub fn from_table(
        table: &SummaryTable,
        metadata: ReportMetadata,
        include_selected_total: bool,
    ) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| ReportRow {
                municipality: row.municipality.clone(),
                cells: row.cells.iter().map(Cell::display).collect(),
                fading: row.fading,
            })
            .collect();

        // Footer cells follow the same notation as their column.
        let selected_total = include_selected_total.then(|| {
            table
                .selected_total()
                .iter()
                .zip(table.columns())
                .map(|(cell, column)| {
                    let shown = cell.display();
                    if column.scientific {
                        reformat_scientific(&shown)
                    } else {
                        shown
                    }
                })
                .collect()
        });

        let fade_ms = match table.removal_mode() {
            RemovalMode::Fade { millis } => Some(millis),
            RemovalMode::Immediate => None,
        };

        Self {
            metadata,
            columns: table.columns().to_vec(),
            rows,
            selected_total,
            fade_ms,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &TableReport) -> String {
    let mut output = String::new();

    output.push_str("# Municipality Offset Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_markdown_table(report));

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Parcels Loaded:** {}\n", metadata.parcels_loaded));
    if metadata.parcels_selected.is_empty() {
        section.push_str("- **Parcels Selected:** none\n");
    } else {
        section.push_str(&format!(
            "- **Parcels Selected:** {}\n",
            metadata.parcels_selected.join(", ")
        ));
    }
    section.push_str(&format!("- **Toggles Applied:** {}\n", metadata.events_applied));
    section.push_str(&format!("- **Municipalities:** {}\n", metadata.municipalities));
    section.push('\n');

    section
}

fn generate_markdown_table(report: &TableReport) -> String {
    let mut table = String::new();

    if report.rows.is_empty() {
        table.push_str("No municipalities are represented by the current selection.\n");
        return table;
    }

    let headers: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    table.push_str(&format!("| {} |\n", headers.join(" | ")));
    table.push_str(&format!("|{}\n", ":---|".repeat(headers.len())));

    for row in &report.rows {
        let cells: Vec<String> = row.cells.iter().map(|c| escape_markdown(c)).collect();
        let mut line = format!("| {} |", cells.join(" | "));
        if row.fading {
            line = format!("{} *(removing)*", line);
        }
        table.push_str(&line);
        table.push('\n');
    }

    if let Some(ref total) = report.selected_total {
        let cells: Vec<String> = total
            .iter()
            .map(|c| {
                if c.is_empty() {
                    String::new()
                } else {
                    format!("**{}**", escape_markdown(c))
                }
            })
            .collect();
        table.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    table.push('\n');
    table
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Generate an HTML table document.
///
/// Header cells carry the column kind as their class (and `scientific` when
/// flagged), the way the reporting page's script expects them.
pub fn generate_html_report(report: &TableReport) -> String {
    let mut html = String::new();

    html.push_str("<table class=\"municipality-summary\">\n<thead><tr>");
    for column in &report.columns {
        let mut class = column.kind.to_string();
        if column.scientific {
            class.push_str(" scientific");
        }
        html.push_str(&format!(
            "<th class=\"{}\">{}</th>",
            class,
            escape_html(&column.name)
        ));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &report.rows {
        if row.fading {
            html.push_str(&format!(
                "<tr class=\"fading\" data-fade-ms=\"{}\">",
                report.fade_ms.unwrap_or_default()
            ));
        } else {
            html.push_str("<tr>");
        }
        for cell in &row.cells {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n");

    if let Some(ref total) = report.selected_total {
        html.push_str("<tfoot><tr class=\"checkTotal\">");
        for cell in total {
            html.push_str(&format!("<td class=\"checkTot\">{}</td>", escape_html(cell)));
        }
        html.push_str("</tr></tfoot>\n");
    }

    html.push_str("</table>\n");
    html
}

/// Generate a JSON report.
pub fn generate_json_report(report: &TableReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a rendered report to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

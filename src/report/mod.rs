//! View side: the summary table and its renderers.

pub mod format;
pub mod generator;
pub mod table;

pub use generator::{
    generate_html_report, generate_json_report, generate_markdown_report, write_report,
    ReportMetadata, TableReport,
};
pub use table::{Cell, RemovalMode, SummaryTable};

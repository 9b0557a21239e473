//! Municipality summary table.
//!
//! The table is the view side of the engine: it applies diffs as row
//! inserts, cell patches and row removals, and knows how to display its
//! cells. Nothing here feeds back into engine state.

use crate::models::{ColumnKind, ColumnSpec, Diff, DiffEntry, FieldChange, RowFields};
use crate::report::format::{format_plain, parse_numeric, reformat_scientific};
use tracing::{debug, warn};

/// Label of the footer row summing totalable columns.
pub const SELECTED_TOTAL_LABEL: &str = "Selected Total";

/// How removed rows leave the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalMode {
    /// Drop the row as soon as the diff is applied.
    #[default]
    Immediate,
    /// Keep the row, marked fading, until `flush_transitions`.
    Fade { millis: u64 },
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric value, reading numeric text as well.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(v) => Some(*v),
            Cell::Text(t) => parse_numeric(t),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => format_plain(*v),
            Cell::Text(t) => t.clone(),
        }
    }
}

/// One municipality row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub municipality: String,
    pub cells: Vec<Cell>,
    /// Removed by the engine, still shown while its transition runs.
    pub fading: bool,
}

/// Counts of what one `apply` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub inserted: usize,
    pub patched: usize,
    pub removed: usize,
    pub skipped: usize,
}

/// Summary table laid out by declared columns.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    removal: RemovalMode,
}

impl SummaryTable {
    pub fn new(columns: Vec<ColumnSpec>, removal: RemovalMode) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            removal,
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// All rows in insertion order, fading ones included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows that are not on their way out.
    pub fn live_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| !r.fading)
    }

    pub fn removal_mode(&self) -> RemovalMode {
        self.removal
    }

    pub fn row(&self, municipality: &str) -> Option<&Row> {
        self.live_rows().find(|r| r.municipality == municipality)
    }

    /// Index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Apply one engine diff.
    pub fn apply(&mut self, diff: &Diff) -> ApplyStats {
        let mut stats = ApplyStats::default();

        for entry in diff {
            match entry {
                DiffEntry::Added {
                    municipality,
                    fields,
                } => {
                    // A row still fading out is replaced, not duplicated.
                    self.rows
                        .retain(|r| !(r.fading && r.municipality == *municipality));
                    let row = self.build_row(municipality, fields);
                    self.rows.push(row);
                    stats.inserted += 1;
                }
                DiffEntry::Updated {
                    municipality,
                    changed,
                } => {
                    if self.patch_row(municipality, changed) {
                        stats.patched += 1;
                    } else {
                        warn!("No row for updated municipality {}", municipality);
                        stats.skipped += 1;
                    }
                }
                DiffEntry::Removed { municipality } => {
                    if self.remove_row(municipality) {
                        stats.removed += 1;
                    } else {
                        warn!("No row for removed municipality {}", municipality);
                        stats.skipped += 1;
                    }
                }
            }
        }

        debug!(
            "Applied diff: {} inserted, {} patched, {} removed, {} skipped",
            stats.inserted, stats.patched, stats.removed, stats.skipped
        );
        stats
    }

    /// Drop every row whose fade-out has been shown.
    pub fn flush_transitions(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.fading);
        before - self.rows.len()
    }

    /// Rewrite numeric cells of scientific columns in exponential notation.
    pub fn reformat_scientific(&mut self) {
        let scientific: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.scientific)
            .map(|(i, _)| i)
            .collect();

        for row in &mut self.rows {
            for &i in &scientific {
                let cell = &mut row.cells[i];
                let reformatted = match cell {
                    Cell::Empty => continue,
                    Cell::Number(v) => reformat_scientific(&format_plain(*v)),
                    Cell::Text(t) => reformat_scientific(t),
                };
                *cell = Cell::Text(reformatted);
            }
        }
    }

    /// Footer row: the label in the municipality column and the sum of every
    /// totalable column over the live rows. Other columns are empty.
    pub fn selected_total(&self) -> Vec<Cell> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                if column.kind == ColumnKind::Municipality {
                    return Cell::Text(SELECTED_TOTAL_LABEL.to_string());
                }
                if !column.total {
                    return Cell::Empty;
                }
                let sum: f64 = self
                    .live_rows()
                    .filter_map(|r| r.cells[i].as_f64())
                    .sum();
                Cell::Number(sum)
            })
            .collect()
    }

    fn build_row(&self, municipality: &str, fields: &RowFields) -> Row {
        let cells = self
            .columns
            .iter()
            .map(|column| {
                let value = match column.kind {
                    ColumnKind::Municipality => return Cell::Text(municipality.to_string()),
                    ColumnKind::Population => fields.population,
                    ColumnKind::Offset => fields.offsets.get(&column.name).copied(),
                    ColumnKind::Net => fields.nets.get(&column.name).copied(),
                    ColumnKind::Impact => fields.impacts.get(&column.name).copied(),
                    ColumnKind::Plain => None,
                };
                value.map_or(Cell::Empty, Cell::Number)
            })
            .collect();

        Row {
            municipality: municipality.to_string(),
            cells,
            fading: false,
        }
    }

    fn patch_row(&mut self, municipality: &str, changed: &[FieldChange]) -> bool {
        let indices: Vec<Option<usize>> = changed
            .iter()
            .map(|change| self.column_index(&change.column))
            .collect();

        let Some(row) = self
            .rows
            .iter_mut()
            .find(|r| !r.fading && r.municipality == municipality)
        else {
            return false;
        };

        for (change, index) in changed.iter().zip(indices) {
            match index {
                Some(i) => row.cells[i] = Cell::Number(change.value),
                None => debug!("Column {} is not displayed", change.column),
            }
        }
        true
    }

    fn remove_row(&mut self, municipality: &str) -> bool {
        let Some(pos) = self
            .rows
            .iter()
            .position(|r| !r.fading && r.municipality == municipality)
        else {
            return false;
        };

        match self.removal {
            RemovalMode::Immediate => {
                self.rows.remove(pos);
            }
            RemovalMode::Fade { .. } => self.rows[pos].fading = true,
        }
        true
    }
}

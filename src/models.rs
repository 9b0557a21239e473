//! Data models for the parcel tally.
//!
//! This module contains the core data structures shared by the engine,
//! the input loaders and the summary table: parcel and baseline records,
//! column metadata, municipality accumulators and diffs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a parcel row in the input payload.
pub type ParcelId = String;

/// All parcels of the payload, keyed by parcel id.
pub type ParcelCatalog = BTreeMap<ParcelId, ParcelRecord>;

/// Baseline impact data, keyed by municipality name.
pub type BaselineImpacts = BTreeMap<String, BaselineImpact>;

/// A parcel as supplied by the page payload.
///
/// Apart from `municipalities`, every key of the JSON object is kept in
/// `values`; offset categories read their base value from it by prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    /// Municipality name to contribution fraction (0.0 - 1.0).
    #[serde(default)]
    pub municipalities: BTreeMap<String, f64>,
    /// Remaining payload fields (offset bases and anything else).
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl ParcelRecord {
    /// Creates a parcel from municipality fractions and numeric bases.
    pub fn new<M, V>(municipalities: M, bases: V) -> Self
    where
        M: IntoIterator<Item = (String, f64)>,
        V: IntoIterator<Item = (String, f64)>,
    {
        Self {
            municipalities: municipalities.into_iter().collect(),
            values: bases
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::from(v)))
                .collect(),
        }
    }

    /// Returns the numeric base value stored under `prefix`.
    ///
    /// Numeric strings are accepted since payloads are often written from
    /// spreadsheets.
    pub fn base_value(&self, prefix: &str) -> Option<f64> {
        match self.values.get(prefix)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// Baseline (pre-existing) data for one municipality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineImpact {
    /// Municipality population.
    #[serde(default, rename = "pop", alias = "population")]
    pub population: Option<f64>,
    /// Impact category name to baseline value.
    #[serde(default)]
    pub impacts: BTreeMap<String, f64>,
}

impl BaselineImpact {
    /// Whether this record seeds an accumulator at startup.
    pub fn seeds_accumulator(&self) -> bool {
        !self.impacts.is_empty()
    }
}

/// Role of a column in the municipality summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// The municipality name column.
    Municipality,
    /// The population column.
    Population,
    /// Accumulated offsets from selected parcels.
    Offset,
    /// Offset total minus baseline impact.
    Net,
    /// Baseline impact, fixed at creation.
    Impact,
    /// Anything else; rendered empty.
    Plain,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Municipality => write!(f, "municipality"),
            ColumnKind::Population => write!(f, "population"),
            ColumnKind::Offset => write!(f, "offset"),
            ColumnKind::Net => write!(f, "net"),
            ColumnKind::Impact => write!(f, "impact"),
            ColumnKind::Plain => write!(f, "plain"),
        }
    }
}

/// Declared metadata for one summary table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column header text.
    pub name: String,
    /// What the column holds.
    pub kind: ColumnKind,
    /// Render numbers in exponential notation.
    #[serde(default)]
    pub scientific: bool,
    /// Include the column in the "Selected Total" row.
    #[serde(default)]
    pub total: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            scientific: false,
            total: false,
        }
    }

    pub fn scientific(mut self) -> Self {
        self.scientific = true;
        self
    }

    pub fn totaled(mut self) -> Self {
        self.total = true;
        self
    }
}

/// Running totals for one municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityAccumulator {
    /// Population, set once at creation.
    pub population: Option<f64>,
    /// Number of currently-selected parcels touching this municipality.
    pub selections: u32,
    /// Seeded from baseline impact data; keeps the accumulator alive.
    pub pinned: bool,
    /// Offset category name to accumulated value.
    pub offset_totals: BTreeMap<String, f64>,
    /// Net category name to accumulated value.
    pub net_totals: BTreeMap<String, f64>,
    /// Impact category name to baseline value.
    pub impact_totals: BTreeMap<String, f64>,
}

impl MunicipalityAccumulator {
    /// Selections plus one for the baseline pin.
    pub fn reference_count(&self) -> u32 {
        self.selections + u32::from(self.pinned)
    }

    /// Full field values, as carried by an `Added` diff entry.
    pub fn fields(&self) -> RowFields {
        RowFields {
            population: self.population,
            offsets: self.offset_totals.clone(),
            nets: self.net_totals.clone(),
            impacts: self.impact_totals.clone(),
        }
    }
}

/// Field values of a municipality row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    pub offsets: BTreeMap<String, f64>,
    pub nets: BTreeMap<String, f64>,
    pub impacts: BTreeMap<String, f64>,
}


/// A single changed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub column: String,
    pub value: f64,
}

/// One municipality-level change produced by an engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiffEntry {
    Added {
        municipality: String,
        fields: RowFields,
    },
    Updated {
        municipality: String,
        changed: Vec<FieldChange>,
    },
    Removed {
        municipality: String,
    },
}

impl DiffEntry {
    pub fn municipality(&self) -> &str {
        match self {
            DiffEntry::Added { municipality, .. }
            | DiffEntry::Updated { municipality, .. }
            | DiffEntry::Removed { municipality } => municipality,
        }
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEntry::Added {
                municipality,
                fields,
            } => write!(
                f,
                "+ {} ({} offsets, {} nets, {} impacts)",
                municipality,
                fields.offsets.len(),
                fields.nets.len(),
                fields.impacts.len()
            ),
            DiffEntry::Updated {
                municipality,
                changed,
            } => {
                write!(f, "~ {}", municipality)?;
                for change in changed {
                    write!(f, " {}={}", change.column, change.value)?;
                }
                Ok(())
            }
            DiffEntry::Removed { municipality } => write!(f, "- {}", municipality),
        }
    }
}

/// Ordered set of changes produced by one engine operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff {
    pub entries: Vec<DiffEntry>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DiffEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Names of municipalities added by this diff.
    pub fn added(&self) -> Vec<&str> {
        self.names_of(|e| matches!(e, DiffEntry::Added { .. }))
    }

    /// Names of municipalities updated by this diff.
    pub fn updated(&self) -> Vec<&str> {
        self.names_of(|e| matches!(e, DiffEntry::Updated { .. }))
    }

    /// Names of municipalities removed by this diff.
    pub fn removed(&self) -> Vec<&str> {
        self.names_of(|e| matches!(e, DiffEntry::Removed { .. }))
    }

    fn names_of(&self, pred: impl Fn(&DiffEntry) -> bool) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| pred(*e))
            .map(DiffEntry::municipality)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A checkbox toggle on a parcel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleEvent {
    pub parcel: ParcelId,
    pub checked: bool,
}

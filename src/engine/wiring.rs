//! Offset -> net -> impact category wiring.
//!
//! Column metadata is resolved once into an explicit mapping so that no
//! operation ever searches header text again.

use crate::engine::error::{EngineError, EngineResult};
use crate::models::{ColumnKind, ColumnSpec};
use std::collections::HashSet;

const NET_SUFFIX: &str = "_net";
const IMPACT_SUFFIX: &str = "_impact";

/// One offset category and the columns derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    /// Offset column name, e.g. `water_offsets`.
    pub offset: String,
    /// Parcel payload key holding the base value, e.g. `water`.
    pub prefix: String,
    /// Net column name, e.g. `water_net`.
    pub net: String,
    /// Impact column name, e.g. `water_impact`, when declared.
    pub impact: Option<String>,
}

/// Resolved category wiring, in declared column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryWiring {
    links: Vec<CategoryLink>,
    impacts: Vec<String>,
}

/// Text before the first `_`, or the whole name when there is none.
pub fn category_prefix(name: &str) -> &str {
    name.split_once('_').map_or(name, |(prefix, _)| prefix)
}

fn names_of(columns: &[ColumnSpec], kind: ColumnKind) -> Vec<&str> {
    columns
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.name.as_str())
        .collect()
}

impl CategoryWiring {
    /// Resolve wiring from declared columns.
    ///
    /// Every offset column needs a `<prefix>_net` column; a `<prefix>_impact`
    /// column is attached when declared. Duplicate names are rejected.
    pub fn resolve(columns: &[ColumnSpec]) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EngineError::MalformedCategoryWiring(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        let nets = names_of(columns, ColumnKind::Net);
        let impacts = names_of(columns, ColumnKind::Impact);

        let mut links = Vec::new();
        let mut prefixes = HashSet::new();
        for offset in names_of(columns, ColumnKind::Offset) {
            let prefix = category_prefix(offset);
            if !prefixes.insert(prefix) {
                return Err(EngineError::MalformedCategoryWiring(format!(
                    "offset '{}' reuses prefix '{}'",
                    offset, prefix
                )));
            }

            let net = format!("{}{}", prefix, NET_SUFFIX);
            if !nets.contains(&net.as_str()) {
                return Err(EngineError::MalformedCategoryWiring(format!(
                    "offset '{}' has no net column '{}'",
                    offset, net
                )));
            }

            let impact = format!("{}{}", prefix, IMPACT_SUFFIX);
            let impact = impacts.contains(&impact.as_str()).then_some(impact);

            links.push(CategoryLink {
                offset: offset.to_string(),
                prefix: prefix.to_string(),
                net,
                impact,
            });
        }

        Ok(Self {
            links,
            impacts: impacts.into_iter().map(String::from).collect(),
        })
    }

    /// Offset categories in declared order.
    pub fn links(&self) -> &[CategoryLink] {
        &self.links
    }

    /// Every declared impact column, linked or not.
    pub fn impact_columns(&self) -> &[String] {
        &self.impacts
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("municipalities", ColumnKind::Municipality),
            ColumnSpec::new("pop", ColumnKind::Population),
            ColumnSpec::new("water_impact", ColumnKind::Impact),
            ColumnSpec::new("water_offsets", ColumnKind::Offset),
            ColumnSpec::new("water_net", ColumnKind::Net),
        ]
    }

    #[test]
    fn test_category_prefix() {
        assert_eq!(category_prefix("water_offsets"), "water");
        assert_eq!(category_prefix("carbon_stock_offsets"), "carbon");
        assert_eq!(category_prefix("habitat"), "habitat");
    }

    #[test]
    fn test_resolve_links_offset_net_and_impact() {
        let wiring = CategoryWiring::resolve(&water_columns()).unwrap();

        assert_eq!(wiring.len(), 1);
        let link = &wiring.links()[0];
        assert_eq!(link.offset, "water_offsets");
        assert_eq!(link.prefix, "water");
        assert_eq!(link.net, "water_net");
        assert_eq!(link.impact.as_deref(), Some("water_impact"));
        assert_eq!(wiring.impact_columns(), ["water_impact".to_string()]);
    }

    #[test]
    fn test_resolve_impact_is_optional() {
        let columns = vec![
            ColumnSpec::new("carbon_offsets", ColumnKind::Offset),
            ColumnSpec::new("carbon_net", ColumnKind::Net),
        ];
        let wiring = CategoryWiring::resolve(&columns).unwrap();
        assert_eq!(wiring.links()[0].impact, None);
        assert_eq!(wiring.links()[0].net, "carbon_net");
    }

    #[test]
    fn test_resolve_rejects_missing_net() {
        let columns = vec![
            ColumnSpec::new("water_offsets", ColumnKind::Offset),
            ColumnSpec::new("carbon_net", ColumnKind::Net),
        ];
        let err = CategoryWiring::resolve(&columns).unwrap_err();
        assert!(matches!(err, EngineError::MalformedCategoryWiring(_)));
        assert!(err.to_string().contains("water_net"));
    }

    #[test]
    fn test_resolve_rejects_duplicate_columns() {
        let mut columns = water_columns();
        columns.push(ColumnSpec::new("water_net", ColumnKind::Net));
        let err = CategoryWiring::resolve(&columns).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_resolve_rejects_shared_prefix() {
        let columns = vec![
            ColumnSpec::new("water_offsets", ColumnKind::Offset),
            ColumnSpec::new("water_credits", ColumnKind::Offset),
            ColumnSpec::new("water_net", ColumnKind::Net),
        ];
        assert!(CategoryWiring::resolve(&columns).is_err());
    }
}

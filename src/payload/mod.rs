//! Page payload loading.
//!
//! This module reads the JSON documents a reporting page embeds: the parcel
//! data, the baseline impact data and, for replays, a list of checkbox
//! toggles.

use crate::models::{BaselineImpacts, ParcelCatalog, ToggleEvent};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} file: {}", what, path.display()))
}

/// Load parcel data: `{parcelId: {municipalities: {...}, <prefix>: number}}`.
pub fn load_parcels(path: &Path) -> Result<ParcelCatalog> {
    let parcels: ParcelCatalog = load_json(path, "parcel data")?;

    for (id, parcel) in &parcels {
        if parcel.municipalities.is_empty() {
            warn!("Parcel {} is not associated with any municipality", id);
        }
        for (municipality, fraction) in &parcel.municipalities {
            if !(0.0..=1.0).contains(fraction) {
                warn!(
                    "Parcel {} contributes {} to {} (outside 0..=1)",
                    id, fraction, municipality
                );
            }
        }
    }

    debug!("Loaded {} parcels from {}", parcels.len(), path.display());
    Ok(parcels)
}

/// Load baseline impact data: `{municipality: {pop: number, impacts: {...}}}`.
pub fn load_baseline(path: &Path) -> Result<BaselineImpacts> {
    let baseline: BaselineImpacts = load_json(path, "baseline impact")?;
    debug!(
        "Loaded baseline data for {} municipalities from {}",
        baseline.len(),
        path.display()
    );
    Ok(baseline)
}

/// Load a toggle replay: `[{"parcel": "P1", "checked": true}, ...]`.
pub fn load_events(path: &Path) -> Result<Vec<ToggleEvent>> {
    load_json(path, "toggle events")
}

/// Append one checkbox flip per id in `flips` to the replay `events`.
///
/// Each flip inverts the parcel's state as left by everything queued before
/// it; a parcel no event has touched yet starts from `is_selected`.
pub fn resolve_toggles<F>(
    events: &[ToggleEvent],
    flips: &[String],
    is_selected: F,
) -> Vec<ToggleEvent>
where
    F: Fn(&str) -> bool,
{
    let mut resolved = events.to_vec();

    for id in flips {
        let selected = resolved
            .iter()
            .rev()
            .find(|e| e.parcel == *id)
            .map_or_else(|| is_selected(id), |e| e.checked);
        resolved.push(ToggleEvent {
            parcel: id.clone(),
            checked: !selected,
        });
    }

    resolved
}

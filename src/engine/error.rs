//! Error taxonomy of the aggregation engine.

use thiserror::Error;

/// Errors returned by engine operations.
///
/// Every operation validates its input before touching state, so an error
/// never leaves a partially applied selection behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `select` referenced a parcel id absent from the parcel data.
    #[error("unknown parcel: {0}")]
    UnknownParcel(String),

    /// `deselect` referenced a parcel that is not currently selected.
    #[error("parcel is not selected: {0}")]
    NotSelected(String),

    /// `select` referenced a parcel that is already selected.
    #[error("parcel is already selected: {0}")]
    AlreadySelected(String),

    /// A selected parcel has no numeric base value for an offset prefix.
    #[error("parcel {parcel} has no numeric value for offset prefix '{prefix}'")]
    MissingOffsetValue { parcel: String, prefix: String },

    /// Column metadata does not wire offsets to nets (and impacts).
    #[error("malformed category wiring: {0}")]
    MalformedCategoryWiring(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

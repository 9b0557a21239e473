//! Aggregation engine.
//!
//! Category wiring is resolved once from column metadata; the aggregator
//! keeps per-municipality totals in step with the selected parcels and
//! reports every change as a diff.

pub mod aggregator;
pub mod error;
pub mod wiring;

pub use aggregator::AggregationEngine;
pub use error::{EngineError, EngineResult};
pub use wiring::{category_prefix, CategoryLink, CategoryWiring};

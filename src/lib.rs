//! Parcel Tally - incremental per-municipality offset aggregation.
//!
//! Parcels carry a base value per impact category and a fractional
//! association with one or more municipalities. Selecting a parcel adds its
//! weighted contribution to every municipality it touches; the engine
//! reports each change as a diff that the summary table applies.

pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod payload;
pub mod report;

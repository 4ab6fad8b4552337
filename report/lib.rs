#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
//! Presentation tables for fitted generalized linear models.
//!
//! A fitted, fully-scored [`snapshot::GlmSnapshot`] goes in; a set of
//! [`table::TwoDimTable`]s comes out through [`output::build_output_tables`].

pub mod coefficients;
pub mod export;
pub mod history;
pub mod multinomial;
pub mod output;
pub mod random;
pub mod ranking;
pub mod snapshot;
pub mod table;
pub mod types;

pub use output::{GlmOutputTables, build_output_tables};
pub use snapshot::{GlmSnapshot, SnapshotError};

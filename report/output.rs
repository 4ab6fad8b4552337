//! The "build all output tables" entry point.

use crate::coefficients::build_single_response_tables;
use crate::history::build_scoring_history_table;
use crate::multinomial::build_per_class_tables;
use crate::random::build_random_coefficients_table;
use crate::snapshot::{CoefficientPresentation, GlmSnapshot, SnapshotError};
use crate::table::TwoDimTable;
use serde::Serialize;

/// Every presentation table derived from one snapshot, plus the scalar
/// summaries passed through unchanged. Absent tables were not applicable.
#[derive(Debug, Clone, Serialize)]
pub struct GlmOutputTables {
    pub coefficients_table: Option<TwoDimTable>,
    pub coefficients_table_multinomials_with_class_names: Option<TwoDimTable>,
    pub standardized_coefficient_magnitudes: Option<TwoDimTable>,
    pub random_coefficients_table: Option<TwoDimTable>,
    pub scoring_history_early_stop: Option<TwoDimTable>,
    pub lambda_best: f64,
    pub lambda_1se: f64,
    pub dispersion: f64,
}

impl GlmOutputTables {
    /// The produced tables keyed by their output name, in a fixed order.
    pub fn tables(&self) -> Vec<(&'static str, &TwoDimTable)> {
        [
            ("coefficients_table", &self.coefficients_table),
            (
                "coefficients_table_multinomials_with_class_names",
                &self.coefficients_table_multinomials_with_class_names,
            ),
            (
                "standardized_coefficient_magnitudes",
                &self.standardized_coefficient_magnitudes,
            ),
            ("random_coefficients_table", &self.random_coefficients_table),
            ("scoring_history_early_stop", &self.scoring_history_early_stop),
        ]
        .into_iter()
        .filter_map(|(key, table)| table.as_ref().map(|table| (key, table)))
        .collect()
    }
}

/// Validates `snapshot` and derives every applicable table from it.
///
/// Multinomial and ordinal models get the per-class coefficient tables,
/// everything else the single-response tables. Random coefficients are only
/// reported on the single-response path. Missing optional inputs simply leave
/// the matching table out; inconsistent shapes are rejected before anything
/// is built.
pub fn build_output_tables(snapshot: &GlmSnapshot) -> Result<GlmOutputTables, SnapshotError> {
    if let Err(e) = snapshot.validate() {
        log::warn!("Rejecting {} model snapshot: {e}", snapshot.model_category);
        return Err(e);
    }

    let mut output = GlmOutputTables {
        coefficients_table: None,
        coefficients_table_multinomials_with_class_names: None,
        standardized_coefficient_magnitudes: None,
        random_coefficients_table: None,
        scoring_history_early_stop: None,
        lambda_best: snapshot.lambda_best,
        lambda_1se: snapshot.lambda_1se,
        dispersion: snapshot.dispersion,
    };
    let names = &snapshot.coefficient_names;

    match snapshot.presentation() {
        Some(CoefficientPresentation::PerClass {
            beta,
            standardized,
            class_names,
        }) => {
            log::debug!(
                "Building per-class coefficient tables for {} classes x {} coefficients",
                beta.nrows(),
                beta.ncols()
            );
            let tables = build_per_class_tables(names, beta, standardized, class_names);
            output.coefficients_table = Some(tables.coefficients);
            output.coefficients_table_multinomials_with_class_names =
                tables.coefficients_with_class_names;
            output.standardized_coefficient_magnitudes = tables.magnitudes;
        }
        Some(CoefficientPresentation::Single {
            beta,
            standardized,
            significance,
        }) => {
            log::debug!(
                "Building single-response coefficient tables for {} coefficients (p-values: {})",
                beta.len(),
                significance.is_some()
            );
            let tables = build_single_response_tables(names, beta, standardized, significance);
            output.coefficients_table = Some(tables.coefficients);
            output.standardized_coefficient_magnitudes = tables.magnitudes;
        }
        None => log::debug!("Model has no coefficients yet; coefficient tables omitted"),
    }
    if output.coefficients_table.is_some() && output.standardized_coefficient_magnitudes.is_none() {
        log::debug!("No standardized coefficients; magnitude table omitted");
    }

    if !snapshot.is_per_class() {
        if let (Some(estimates), Some(levels)) = (
            &snapshot.random_coefficients,
            &snapshot.random_coefficient_names,
        ) {
            output.random_coefficients_table =
                Some(build_random_coefficients_table(estimates.view(), levels));
        }
    }

    output.scoring_history_early_stop =
        build_scoring_history_table(&snapshot.scoring_history, snapshot.model_category);
    if output.scoring_history_early_stop.is_none() {
        log::debug!("No training checkpoints; scoring history omitted");
    }

    Ok(output)
}

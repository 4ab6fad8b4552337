//! Magnitude ranking of standardized coefficients.
//!
//! Both coefficient layouts rank predictors the same way: drop the trailing
//! intercept, reduce each predictor to a single magnitude, sort descending.
//! They differ only in the reduction and in whether a sign is available.

use crate::table::{ColumnType, TableSchemaBuilder, TwoDimTable};
use crate::types::Sign;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis, s};
use serde::Serialize;

/// One ranked predictor: its position in the original (intercept-excluded)
/// order, its magnitude and the attributed sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedPredictor {
    pub index: usize,
    pub magnitude: f64,
    pub sign: Sign,
}

/// Where predictor magnitudes come from.
#[derive(Debug, Clone, Copy)]
pub enum MagnitudeSource<'a> {
    /// Single response: magnitude is `abs(standardized)`, sign taken from the raw coefficient.
    Single {
        standardized: ArrayView1<'a, f64>,
        raw: ArrayView1<'a, f64>,
    },
    /// One row per response class: magnitude is the sum of `abs(standardized)`
    /// across classes. No sign is attributed, every entry is `POS`.
    PerClass { standardized: ArrayView2<'a, f64> },
}

impl MagnitudeSource<'_> {
    /// Ranks every predictor except the trailing intercept.
    pub fn rank(&self) -> Vec<RankedPredictor> {
        match *self {
            MagnitudeSource::Single { standardized, raw } => {
                assert_eq!(
                    standardized.len(),
                    raw.len(),
                    "standardized and raw coefficient vectors differ in length"
                );
                let predictors = standardized.len().saturating_sub(1);
                rank_magnitudes(
                    standardized.slice(s![..predictors]),
                    Some(raw.slice(s![..predictors])),
                )
            }
            MagnitudeSource::PerClass { standardized } => {
                let predictors = standardized.ncols().saturating_sub(1);
                let summed: Array1<f64> = standardized
                    .slice(s![.., ..predictors])
                    .mapv(f64::abs)
                    .sum_axis(Axis(0));
                rank_magnitudes(summed.view(), None)
            }
        }
    }
}

/// Sorts `values` by descending absolute value.
///
/// Equal magnitudes keep their original relative order. NaN magnitudes sort
/// after everything else. With a sign source each entry is `POS` when
/// `signs[i] >= 0` and `NEG` otherwise; without one every entry is `POS`.
///
/// Panics when `signs` is given with a different length than `values`.
pub fn rank_magnitudes(
    values: ArrayView1<'_, f64>,
    signs: Option<ArrayView1<'_, f64>>,
) -> Vec<RankedPredictor> {
    if let Some(signs) = signs {
        assert_eq!(
            values.len(),
            signs.len(),
            "magnitude values and sign source differ in length"
        );
    }

    let mut ranked: Vec<RankedPredictor> = values
        .iter()
        .enumerate()
        .map(|(index, &value)| RankedPredictor {
            index,
            magnitude: value.abs(),
            sign: signs.map_or(Sign::Pos, |signs| Sign::of(signs[index])),
        })
        .collect();

    // `sort_by` is stable, so ties stay in predictor order.
    ranked.sort_by(|a, b| sort_key(b.magnitude).total_cmp(&sort_key(a.magnitude)));
    ranked
}

fn sort_key(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        f64::NEG_INFINITY
    } else {
        magnitude
    }
}

/// Builds the "Standardized Coefficient Magnitudes" table from a ranking.
/// `predictor_names` excludes the intercept and is indexed by `RankedPredictor::index`.
pub fn build_magnitude_table(predictor_names: &[String], ranked: &[RankedPredictor]) -> TwoDimTable {
    assert_eq!(
        predictor_names.len(),
        ranked.len(),
        "one magnitude per non-intercept predictor"
    );
    let row_headers = ranked
        .iter()
        .map(|entry| predictor_names[entry.index].clone())
        .collect();

    let mut schema = TableSchemaBuilder::new();
    schema
        .push("Coefficients", ColumnType::Double, "%5f")
        .push("Sign", ColumnType::Str, "%s");

    let mut table = TwoDimTable::new(
        "Standardized Coefficient Magnitudes",
        "standardized coefficient magnitudes",
        row_headers,
        schema.freeze(),
        "names",
    );
    for (row, entry) in ranked.iter().enumerate() {
        table.set(row, 0, entry.magnitude);
        table.set(row, 1, entry.sign.as_str());
    }
    table
}

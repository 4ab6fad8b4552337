//! Coefficient tables for single-response models (regression, binomial and
//! every other category without per-class coefficients).

use crate::ranking::{MagnitudeSource, build_magnitude_table};
use crate::snapshot::SignificanceStats;
use crate::table::{ColumnType, TableSchemaBuilder, TwoDimTable};
use ndarray::ArrayView1;

/// The coefficient table plus, when standardized coefficients exist, the magnitude table.
#[derive(Debug, Clone)]
pub struct SingleResponseTables {
    pub coefficients: TwoDimTable,
    pub magnitudes: Option<TwoDimTable>,
}

/// Row headers with the trailing intercept name moved to the front.
pub fn intercept_first(names: &[String]) -> Vec<String> {
    let Some((intercept, predictors)) = names.split_last() else {
        return Vec::new();
    };
    std::iter::once(intercept)
        .chain(predictors)
        .cloned()
        .collect()
}

/// Writes `values` (intercept last) into column `col` in intercept-first row order.
pub(crate) fn fill_intercept_first(table: &mut TwoDimTable, col: usize, values: ArrayView1<'_, f64>) {
    assert_eq!(
        values.len(),
        table.row_count(),
        "column '{}' of table '{}' needs one value per row",
        table.schema().columns()[col].name,
        table.name()
    );
    let Some(last) = values.len().checked_sub(1) else {
        return;
    };
    table.set(0, col, values[last]);
    for (i, &value) in values.iter().take(last).enumerate() {
        table.set(i + 1, col, value);
    }
}

/// Builds the "Coefficients" table.
///
/// Columns are `Coefficients`, then `Std. Error`, `z value`, `p value` when
/// significance statistics are available, and `Standardized Coefficients`
/// last. Standardized cells stay empty when no standardized vector is given.
pub fn build_coefficients_table(
    names: &[String],
    beta: ArrayView1<'_, f64>,
    standardized: Option<ArrayView1<'_, f64>>,
    significance: Option<&SignificanceStats>,
) -> TwoDimTable {
    assert_eq!(
        names.len(),
        beta.len(),
        "coefficient names and coefficients differ in length"
    );

    let mut schema = TableSchemaBuilder::new();
    schema.push("Coefficients", ColumnType::Double, "%5f");
    if significance.is_some() {
        schema
            .push("Std. Error", ColumnType::Double, "%5f")
            .push("z value", ColumnType::Double, "%5f")
            .push("p value", ColumnType::Double, "%5f");
    }
    let standardized_col = schema.len();
    schema.push("Standardized Coefficients", ColumnType::Double, "%5f");

    let mut table = TwoDimTable::new(
        "Coefficients",
        "glm coefficients",
        intercept_first(names),
        schema.freeze(),
        "names",
    );

    fill_intercept_first(&mut table, 0, beta);
    if let Some(stats) = significance {
        fill_intercept_first(&mut table, 1, stats.std_err.view());
        fill_intercept_first(&mut table, 2, stats.z_values.view());
        fill_intercept_first(&mut table, 3, stats.p_values.view());
    }
    if let Some(standardized) = standardized {
        fill_intercept_first(&mut table, standardized_col, standardized);
    }
    table
}

/// Builds the coefficient table and, given standardized coefficients, the
/// magnitude table ranked by `abs(standardized)` with signs from `beta`.
pub fn build_single_response_tables<'a>(
    names: &[String],
    beta: ArrayView1<'a, f64>,
    standardized: Option<ArrayView1<'a, f64>>,
    significance: Option<&SignificanceStats>,
) -> SingleResponseTables {
    let coefficients = build_coefficients_table(names, beta, standardized, significance);
    let magnitudes = standardized.map(|standardized| {
        let ranked = MagnitudeSource::Single {
            standardized,
            raw: beta,
        }
        .rank();
        build_magnitude_table(&names[..names.len().saturating_sub(1)], &ranked)
    });
    SingleResponseTables {
        coefficients,
        magnitudes,
    }
}

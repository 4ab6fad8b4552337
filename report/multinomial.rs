//! Coefficient tables for multinomial and ordinal models, where every
//! response class has its own coefficient vector.

use crate::coefficients::{fill_intercept_first, intercept_first};
use crate::ranking::{MagnitudeSource, build_magnitude_table};
use crate::table::{ColumnType, TableSchema, TwoDimTable};
use ndarray::ArrayView2;

#[derive(Debug, Clone)]
pub struct PerClassTables {
    /// Columns `coefs_class_<i>` then `std_coefs_class_<i>` for every class index.
    pub coefficients: TwoDimTable,
    /// The same table with class labels in place of class indices; only for more than two classes.
    pub coefficients_with_class_names: Option<TwoDimTable>,
    pub magnitudes: Option<TwoDimTable>,
}

/// `coefs_class_<label>` for every label, followed by `std_coefs_class_<label>`.
pub fn class_column_names<L: std::fmt::Display>(labels: &[L]) -> Vec<String> {
    let raw = labels.iter().map(|label| format!("coefs_class_{label}"));
    let standardized = labels.iter().map(|label| format!("std_coefs_class_{label}"));
    raw.chain(standardized).collect()
}

/// Builds the per-class coefficient table, its class-named variant and the
/// cross-class magnitude table.
///
/// `beta` and `standardized` have one row per class and one column per
/// coefficient name (intercept last). Magnitudes sum `abs(standardized)`
/// over classes and carry no sign, so every row reads `POS`.
pub fn build_per_class_tables(
    names: &[String],
    beta: ArrayView2<'_, f64>,
    standardized: Option<ArrayView2<'_, f64>>,
    class_names: &[String],
) -> PerClassTables {
    assert_eq!(
        names.len(),
        beta.ncols(),
        "coefficient names and per-class coefficients differ in length"
    );
    if let Some(standardized) = standardized {
        assert_eq!(
            standardized.dim(),
            beta.dim(),
            "raw and standardized per-class coefficients differ in shape"
        );
    }

    let classes = beta.nrows();
    let class_indices: Vec<usize> = (0..classes).collect();
    let schema = TableSchema::uniform(class_column_names(&class_indices), ColumnType::Double, "%5f");
    let mut coefficients = TwoDimTable::new(
        "Coefficients",
        "glm multinomial coefficients",
        intercept_first(names),
        schema,
        "names",
    );
    for (class, row) in beta.rows().into_iter().enumerate() {
        fill_intercept_first(&mut coefficients, class, row);
    }
    if let Some(standardized) = standardized {
        for (class, row) in standardized.rows().into_iter().enumerate() {
            fill_intercept_first(&mut coefficients, classes + class, row);
        }
    }

    let coefficients_with_class_names = (classes > 2).then(|| {
        assert!(
            class_names.len() >= classes,
            "{classes} response classes but only {} class names",
            class_names.len()
        );
        coefficients.relabeled(
            "Coefficients with class names",
            class_column_names(&class_names[..classes]),
        )
    });

    let magnitudes = standardized.map(|standardized| {
        let ranked = MagnitudeSource::PerClass { standardized }.rank();
        build_magnitude_table(&names[..names.len().saturating_sub(1)], &ranked)
    });

    PerClassTables {
        coefficients,
        coefficients_with_class_names,
        magnitudes,
    }
}

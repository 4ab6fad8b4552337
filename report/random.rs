use crate::table::{ColumnType, TableSchema, TwoDimTable};
use ndarray::ArrayView1;

/// Builds the HGLM random-effects table: one row per level, one `Random Coefficients` column.
pub fn build_random_coefficients_table(
    estimates: ArrayView1<'_, f64>,
    level_names: &[String],
) -> TwoDimTable {
    assert_eq!(
        estimates.len(),
        level_names.len(),
        "random coefficients and level names differ in length"
    );
    let mut table = TwoDimTable::new(
        "HGLM Random Coefficients",
        "HGLM random coefficients",
        level_names.to_vec(),
        TableSchema::uniform(["Random Coefficients"], ColumnType::Double, "%5f"),
        "names",
    );
    for (row, &estimate) in estimates.iter().enumerate() {
        table.set(row, 0, estimate);
    }
    table
}

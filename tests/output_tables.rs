use approx::assert_abs_diff_eq;
use glmreport::snapshot::SnapshotError;
use glmreport::table::{Cell, TwoDimTable};
use glmreport::types::ModelCategory;
use glmreport::{GlmSnapshot, build_output_tables};
use std::fs;
use tempfile::tempdir;

const BINOMIAL_SNAPSHOT: &str = r#"
model_category = "Binomial"
lambda_best = 0.001
coefficient_names = ["x1", "x2", "Intercept"]
response_domain = ["no", "yes"]

[beta]
v = 1
dim = [3]
data = [1.0, -2.0, 3.0]

[standardized_beta]
v = 1
dim = [3]
data = [0.5, -0.8, 3.0]

[scoring_history]
start_time_ms = 1600000000000
training_time_ms = [1600000000250, 1600000001250, 1600000123004]

[[scoring_history.training]]
rmse = 0.48
logloss = 0.65
r2 = 0.11
auc = 0.71
pr_auc = 0.66
lift = 1.8
classification_error = 0.31

[[scoring_history.training]]
rmse = 0.44
logloss = 0.58
r2 = 0.19
auc = 0.77
pr_auc = 0.70
lift = 1.9
classification_error = 0.27

[[scoring_history.training]]
rmse = 0.42
logloss = 0.55
r2 = 0.22
auc = 0.80
pr_auc = 0.73
lift = 2.0
classification_error = 0.25

[[scoring_history.validation]]
rmse = 0.50
logloss = 0.69
auc = 0.69

[[scoring_history.validation]]
rmse = 0.47
logloss = 0.63
auc = 0.74
"#;

const MULTINOMIAL_SNAPSHOT: &str = r#"
model_category = "Multinomial"
lambda_best = 0.01
coefficient_names = ["petal_len", "petal_wid", "Intercept"]
response_domain = ["setosa", "versicolor", "virginica"]

[beta_multinomial]
v = 1
dim = [3, 3]
data = [1.0, -1.0, 0.5, 2.0, 0.0, -0.5, -3.0, 1.0, 0.0]

[standardized_beta_multinomial]
v = 1
dim = [3, 3]
data = [0.1, -0.4, 0.5, 0.2, 0.1, -0.5, -0.3, 0.2, 0.0]
"#;

fn load(contents: &str) -> GlmSnapshot {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.toml");
    fs::write(&path, contents).unwrap();
    GlmSnapshot::load(&path).unwrap()
}

fn column_names(table: &TwoDimTable) -> Vec<&str> {
    table.schema().names().collect()
}

#[test]
fn binomial_snapshot_produces_coefficients_magnitudes_and_history() {
    let snapshot = load(BINOMIAL_SNAPSHOT);
    assert_eq!(snapshot.model_category, ModelCategory::Binomial);
    let output = build_output_tables(&snapshot).unwrap();

    let coefficients = output.coefficients_table.as_ref().unwrap();
    assert_eq!(coefficients.row_headers(), ["Intercept", "x1", "x2"]);
    assert_eq!(
        column_names(coefficients),
        ["Coefficients", "Standardized Coefficients"]
    );
    assert_eq!(coefficients.value(0, "Coefficients"), Some(3.0));
    assert_eq!(coefficients.value(2, "Coefficients"), Some(-2.0));
    assert_eq!(coefficients.value(1, "Standardized Coefficients"), Some(0.5));

    let magnitudes = output.standardized_coefficient_magnitudes.as_ref().unwrap();
    assert_eq!(magnitudes.row_headers(), ["x2", "x1"]);
    assert_eq!(magnitudes.value(0, "Coefficients"), Some(0.8));
    assert_eq!(magnitudes.get(0, 1).as_str(), Some("NEG"));
    assert_eq!(magnitudes.get(1, 1).as_str(), Some("POS"));

    assert!(output.coefficients_table_multinomials_with_class_names.is_none());
    assert!(output.random_coefficients_table.is_none());
    assert_eq!(output.lambda_best, 0.001);
    assert!(output.lambda_1se.is_nan());
    assert!(output.dispersion.is_nan());
}

#[test]
fn scoring_history_pads_missing_validation_rows_with_nan() {
    let output = build_output_tables(&load(BINOMIAL_SNAPSHOT)).unwrap();
    let history = output.scoring_history_early_stop.as_ref().unwrap();

    assert_eq!(history.row_count(), 3);
    assert_eq!(history.column_count(), 4 + 6 + 7);
    assert_eq!(
        column_names(history)[..4],
        ["Timestamp", "Duration", "Evaluation_Iterations", "Training RMSE"]
    );
    assert_eq!(
        column_names(history)
            .iter()
            .filter(|name| name.contains("RMSE"))
            .count(),
        2
    );

    assert_eq!(history.get(2, 2), &Cell::Int(2));
    assert_eq!(history.get(0, 1).as_str(), Some(" 0.250 sec"));
    assert_eq!(history.get(2, 1).as_str(), Some(" 2 min  3.004 sec"));
    assert_eq!(history.value(2, "Training RMSE"), Some(0.42));
    assert_eq!(history.value(1, "Training AUC"), Some(0.77));
    assert_eq!(history.value(1, "Validation_RMSE"), Some(0.47));
    assert!(history.value(1, "Validation r2").unwrap().is_nan());
    for column in column_names(history)
        .iter()
        .filter(|name| name.starts_with("Validation"))
    {
        assert!(
            history.value(2, column).unwrap().is_nan(),
            "row 2 of '{column}' should be NaN"
        );
    }
}

#[test]
fn regression_history_has_no_classifier_columns() {
    let mut snapshot = load(BINOMIAL_SNAPSHOT);
    snapshot.model_category = ModelCategory::Regression;
    snapshot.scoring_history.validation.clear();

    let output = build_output_tables(&snapshot).unwrap();
    let history = output.scoring_history_early_stop.unwrap();
    assert_eq!(
        column_names(&history),
        [
            "Timestamp",
            "Duration",
            "Evaluation_Iterations",
            "Training RMSE",
            "Training Deviance",
            "Training MAE",
            "Training r2"
        ]
    );
}

#[test]
fn multinomial_snapshot_produces_per_class_tables() {
    let output = build_output_tables(&load(MULTINOMIAL_SNAPSHOT)).unwrap();

    let coefficients = output.coefficients_table.as_ref().unwrap();
    assert_eq!(coefficients.description(), "glm multinomial coefficients");
    assert_eq!(
        column_names(coefficients),
        [
            "coefs_class_0",
            "coefs_class_1",
            "coefs_class_2",
            "std_coefs_class_0",
            "std_coefs_class_1",
            "std_coefs_class_2"
        ]
    );
    assert_eq!(coefficients.row_headers(), ["Intercept", "petal_len", "petal_wid"]);
    assert_eq!(coefficients.value(0, "coefs_class_1"), Some(-0.5));
    assert_eq!(coefficients.value(1, "coefs_class_2"), Some(-3.0));
    assert_eq!(coefficients.value(2, "std_coefs_class_0"), Some(-0.4));

    let named = output
        .coefficients_table_multinomials_with_class_names
        .as_ref()
        .unwrap();
    assert_eq!(named.name(), "Coefficients with class names");
    assert_eq!(column_names(named)[0], "coefs_class_setosa");
    assert_eq!(column_names(named)[5], "std_coefs_class_virginica");
    assert_eq!(named.value(1, "coefs_class_virginica"), Some(-3.0));

    let magnitudes = output.standardized_coefficient_magnitudes.as_ref().unwrap();
    assert_eq!(magnitudes.row_count(), 2);
    assert_eq!(magnitudes.row_headers(), ["petal_wid", "petal_len"]);
    assert_abs_diff_eq!(
        magnitudes.value(0, "Coefficients").unwrap(),
        0.7,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        magnitudes.value(1, "Coefficients").unwrap(),
        0.6,
        epsilon = 1e-12
    );
    for row in 0..2 {
        assert_eq!(magnitudes.get(row, 1).as_str(), Some("POS"));
    }
    assert!(output.scoring_history_early_stop.is_none());
}

#[test]
fn two_class_ordinal_model_skips_class_named_table() {
    let mut snapshot = load(MULTINOMIAL_SNAPSHOT);
    snapshot.model_category = ModelCategory::Ordinal;
    snapshot.beta_multinomial = Some(ndarray::array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    snapshot.standardized_beta_multinomial = None;
    snapshot.response_domain.clear();

    let output = build_output_tables(&snapshot).unwrap();
    let coefficients = output.coefficients_table.as_ref().unwrap();
    assert_eq!(coefficients.column_count(), 4);
    assert!(coefficients.get(0, 2).is_empty());
    assert!(output.coefficients_table_multinomials_with_class_names.is_none());
    assert!(output.standardized_coefficient_magnitudes.is_none());
}

#[test]
fn missing_class_names_are_rejected() {
    let mut snapshot = load(MULTINOMIAL_SNAPSHOT);
    snapshot.response_domain.truncate(2);
    assert!(matches!(
        build_output_tables(&snapshot),
        Err(SnapshotError::MissingClassNames {
            classes: 3,
            found: 2
        })
    ));
}

#[test]
fn saved_snapshot_reloads_to_the_same_tables() {
    let original = load(BINOMIAL_SNAPSHOT);
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.toml");
    original.save(&path).unwrap();
    let reloaded = GlmSnapshot::load(&path).unwrap();

    let before = build_output_tables(&original).unwrap();
    let after = build_output_tables(&reloaded).unwrap();
    assert_eq!(before.tables().len(), after.tables().len());
    for ((key, left), (other_key, right)) in before.tables().into_iter().zip(after.tables()) {
        assert_eq!(key, other_key);
        assert_eq!(left.to_string(), right.to_string(), "table '{key}' differs");
    }
}

#[test]
fn malformed_snapshot_reports_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "model_category = \"Binomial\"\ncoefficient_names = 3\n").unwrap();
    assert!(matches!(
        GlmSnapshot::load(&path),
        Err(SnapshotError::TomlParseError(_))
    ));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;

const HGLM_SNAPSHOT: &str = r#"
model_category = "HGLM"
lambda_best = 0.0
dispersion = 0.8
coefficient_names = ["age", "dose", "Intercept"]
random_coefficient_names = ["site_a", "site_b"]

[beta]
v = 1
dim = [3]
data = [0.25, -1.5, 4.0]

[standardized_beta]
v = 1
dim = [3]
data = [0.9, -0.3, 4.0]

[significance]
std_err = { v = 1, dim = [3], data = [0.1, 0.2, 0.3] }
z_values = { v = 1, dim = [3], data = [2.5, -7.5, 13.0] }
p_values = { v = 1, dim = [3], data = [0.01, 0.0001, 0.0] }

[random_coefficients]
v = 1
dim = [2]
data = [0.125, -0.125]

[scoring_history]
start_time_ms = 1600000000000
training_time_ms = [1600000000500]

[[scoring_history.training]]
rmse = 1.25
mean_residual_deviance = 1.5625
mae = 0.75
r2 = 0.4
"#;

fn write_snapshot(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write snapshot");
    path
}

fn glmreport() -> Command {
    Command::new(env!("CARGO_BIN_EXE_glmreport"))
}

#[test]
fn render_text_prints_every_table() {
    let tmp = tempdir().expect("temporary directory");
    let snapshot = write_snapshot(tmp.path(), "hglm.toml", HGLM_SNAPSHOT);

    let output = glmreport()
        .arg("render")
        .arg(&snapshot)
        .output()
        .expect("run glmreport cli");

    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("Coefficients: glm coefficients"));
    assert!(
        stdout.contains("Standardized Coefficient Magnitudes: standardized coefficient magnitudes")
    );
    assert!(stdout.contains("HGLM Random Coefficients: HGLM random coefficients"));
    assert!(stdout.contains("Scoring History:"));
    assert!(stdout.contains("dispersion: 0.8"));
}

#[test]
fn render_tsv_writes_one_file_per_table() {
    let tmp = tempdir().expect("temporary directory");
    let snapshot = write_snapshot(tmp.path(), "hglm.toml", HGLM_SNAPSHOT);
    let out_dir = tmp.path().join("tables");

    let status = glmreport()
        .arg("render")
        .arg(&snapshot)
        .args(["--format", "tsv", "--output-dir"])
        .arg(&out_dir)
        .status()
        .expect("run glmreport cli");
    assert!(status.success(), "CLI exited with status {status:?}");

    let coefficients =
        fs::read_to_string(out_dir.join("hglm.coefficients_table.tsv")).expect("coefficients tsv");
    let lines: Vec<&str> = coefficients.lines().collect();
    assert_eq!(
        lines[0],
        "names\tCoefficients\tStd. Error\tz value\tp value\tStandardized Coefficients"
    );
    assert_eq!(lines[1], "Intercept\t4.0\t0.3\t13.0\t0.0\t4.0");
    assert_eq!(lines[3], "dose\t-1.5\t0.2\t-7.5\t0.0001\t-0.3");

    let magnitudes =
        fs::read_to_string(out_dir.join("hglm.standardized_coefficient_magnitudes.tsv"))
            .expect("magnitudes tsv");
    assert_eq!(
        magnitudes.lines().collect::<Vec<_>>(),
        ["names\tCoefficients\tSign", "age\t0.9\tPOS", "dose\t0.3\tNEG"]
    );

    let random = fs::read_to_string(out_dir.join("hglm.random_coefficients_table.tsv"))
        .expect("random coefficients tsv");
    assert_eq!(random.lines().nth(2), Some("site_b\t-0.125"));

    let history = fs::read_to_string(out_dir.join("hglm.scoring_history_early_stop.tsv"))
        .expect("history tsv");
    let header = history.lines().next().expect("history header");
    assert_eq!(header, "\tTimestamp\tDuration\tEvaluation_Iterations\tTraining RMSE");
    let first_row: Vec<&str> = history
        .lines()
        .nth(1)
        .expect("history row")
        .split('\t')
        .collect();
    assert_eq!(first_row[2], " 0.500 sec");
    assert_eq!(first_row[3..], ["0", "1.25"]);
    assert!(
        !out_dir
            .join("hglm.coefficients_table_multinomials_with_class_names.tsv")
            .exists()
    );
}

#[test]
fn render_json_writes_one_document() {
    let tmp = tempdir().expect("temporary directory");
    let snapshot = write_snapshot(tmp.path(), "hglm.toml", HGLM_SNAPSHOT);

    let status = glmreport()
        .arg("render")
        .arg(&snapshot)
        .args(["--format", "json", "--output-dir"])
        .arg(tmp.path())
        .status()
        .expect("run glmreport cli");
    assert!(status.success(), "CLI exited with status {status:?}");

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join("hglm.json")).expect("json output"),
    )
    .expect("valid json");
    assert_eq!(json["dispersion"], 0.8);
    assert_eq!(json["random_coefficients_table"]["row_headers"][0], "site_a");
    assert_eq!(json["coefficients_table"]["columns"][1]["name"], "Std. Error");
    assert!(json["coefficients_table_multinomials_with_class_names"].is_null());
}

#[test]
fn validate_reports_layout_and_tables() {
    let tmp = tempdir().expect("temporary directory");
    let snapshot = write_snapshot(tmp.path(), "hglm.toml", HGLM_SNAPSHOT);

    let output = glmreport()
        .arg("validate")
        .arg(&snapshot)
        .output()
        .expect("run glmreport cli");
    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("ok (HGLM single-response"));
    assert!(stdout.contains("random_coefficients_table"));
}

#[test]
fn inconsistent_snapshot_fails_with_error_message() {
    let tmp = tempdir().expect("temporary directory");
    let broken = HGLM_SNAPSHOT.replace(
        "dim = [3]\ndata = [0.25, -1.5, 4.0]",
        "dim = [2]\ndata = [0.25, 4.0]",
    );
    let snapshot = write_snapshot(tmp.path(), "broken.toml", &broken);

    for subcommand in ["render", "validate"] {
        let output = glmreport()
            .arg(subcommand)
            .arg(&snapshot)
            .output()
            .expect("run glmreport cli");
        assert!(!output.status.success(), "{subcommand} accepted a broken snapshot");
        let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
        assert!(
            stderr.contains("Error:") && stderr.contains("'beta' has length 2"),
            "unexpected stderr for {subcommand}: {stderr}"
        );
    }
}

#[test]
fn structured_output_requires_a_directory() {
    let tmp = tempdir().expect("temporary directory");
    let snapshot = write_snapshot(tmp.path(), "hglm.toml", HGLM_SNAPSHOT);

    let status = glmreport()
        .arg("render")
        .arg(&snapshot)
        .args(["--format", "json"])
        .status()
        .expect("run glmreport cli");
    assert!(!status.success());
}

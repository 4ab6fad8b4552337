//! Writing a table set to disk or to a string.

use crate::output::GlmOutputTables;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned, human-readable tables using each column's display format.
    Text,
    /// One tab-separated file per table.
    Tsv,
    /// One JSON document holding every table and scalar.
    Json,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write output file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to write tab-separated table: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Failed to serialize tables to JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Renders every table followed by the scalar summaries.
pub fn render_text(output: &GlmOutputTables) -> String {
    let mut text: String = output
        .tables()
        .into_iter()
        .map(|(_, table)| format!("{table}\n"))
        .collect();
    text.push_str(&format!(
        "lambda_best: {}\nlambda_1se: {}\ndispersion: {}\n",
        output.lambda_best, output.lambda_1se, output.dispersion
    ));
    text
}

/// Writes `output` into `dir` using `stem` as the file-name prefix and
/// returns the paths written.
///
/// - `Text`: `<stem>.txt`
/// - `Tsv`: `<stem>.<table key>.tsv` for every produced table
/// - `Json`: `<stem>.json`
pub fn write_output(
    output: &GlmOutputTables,
    format: OutputFormat,
    dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;
    match format {
        OutputFormat::Text => {
            let path = dir.join(format!("{stem}.txt"));
            fs::write(&path, render_text(output))?;
            Ok(vec![path])
        }
        OutputFormat::Tsv => {
            let mut written = Vec::new();
            for (key, table) in output.tables() {
                let path = dir.join(format!("{stem}.{key}.tsv"));
                table.write_tsv(BufWriter::new(fs::File::create(&path)?))?;
                written.push(path);
            }
            Ok(written)
        }
        OutputFormat::Json => {
            let path = dir.join(format!("{stem}.json"));
            let mut file = BufWriter::new(fs::File::create(&path)?);
            serde_json::to_writer_pretty(&mut file, output)?;
            file.write_all(b"\n")?;
            file.flush()?;
            Ok(vec![path])
        }
    }
}

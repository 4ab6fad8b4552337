//! # Scoring History Table
//!
//! The scoring history lists one row per training checkpoint. Its columns
//! depend on the model category and on which evaluation sets were scored, so
//! the schema is assembled first and frozen before any row is filled.
//!
//! Column layout:
//! 1. `Timestamp`, `Duration`, `Evaluation_Iterations`, `Training RMSE`.
//! 2. The training metric block (without RMSE, which is already present).
//! 3. `Validation_RMSE` and the validation block, if validation was scored.
//! 4. `Cross-Validation_RMSE` and its block, if cross-validation was scored.
//!
//! Block RMSE headers join prefix and metric with `_`; every other metric
//! header joins them with a space.
//!
//! Both the schema and the row filler walk the same `Metric` list, so a
//! column can never be written with another column's value.

use crate::snapshot::ScoringHistory;
use crate::table::{ColumnType, TableSchema, TableSchemaBuilder, TwoDimTable};
use crate::types::{ModelCategory, ScoreSnapshot};
use chrono::{DateTime, Local};

const METRIC_FORMAT: &str = "%.5f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A dataset the model was scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationSet {
    Training,
    Validation,
    CrossValidation,
}

impl EvaluationSet {
    pub fn prefix(self) -> &'static str {
        match self {
            EvaluationSet::Training => "Training",
            EvaluationSet::Validation => "Validation",
            EvaluationSet::CrossValidation => "Cross-Validation",
        }
    }
}

/// One metric column of a scoring-history block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Rmse,
    Deviance,
    Mae,
    R2,
    LogLoss,
    Auc,
    PrAuc,
    Lift,
    ClassificationError,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Rmse => "RMSE",
            Metric::Deviance => "Deviance",
            Metric::Mae => "MAE",
            Metric::R2 => "r2",
            Metric::LogLoss => "LogLoss",
            Metric::Auc => "AUC",
            Metric::PrAuc => "pr_auc",
            Metric::Lift => "Lift",
            Metric::ClassificationError => "Classification Error",
        }
    }

    pub fn value(self, score: &ScoreSnapshot) -> f64 {
        match self {
            Metric::Rmse => score.rmse,
            Metric::Deviance => score.mean_residual_deviance,
            Metric::Mae => score.mae,
            Metric::R2 => score.r2,
            Metric::LogLoss => score.logloss,
            Metric::Auc => score.auc,
            Metric::PrAuc => score.pr_auc,
            Metric::Lift => score.lift,
            Metric::ClassificationError => score.classification_error,
        }
    }
}

/// The category-specific metrics of one block, RMSE excluded.
pub fn category_metrics(category: ModelCategory) -> Vec<Metric> {
    let mut metrics = Vec::new();
    if category == ModelCategory::Regression {
        metrics.extend([Metric::Deviance, Metric::Mae, Metric::R2]);
    }
    if category.is_classifier() {
        metrics.extend([Metric::LogLoss, Metric::R2]);
    }
    if category == ModelCategory::Binomial {
        metrics.extend([Metric::Auc, Metric::PrAuc, Metric::Lift]);
    }
    if category.is_classifier() {
        metrics.push(Metric::ClassificationError);
    }
    metrics
}

/// Every metric column written for `set`, in column order. The training RMSE
/// is a fixed leading column, so the training block starts after it.
pub fn block_metrics(set: EvaluationSet, category: ModelCategory) -> Vec<Metric> {
    let mut metrics = Vec::new();
    if set != EvaluationSet::Training {
        metrics.push(Metric::Rmse);
    }
    metrics.extend(category_metrics(category));
    metrics
}

/// Header of one metric column in the block of `set`.
pub fn column_name(set: EvaluationSet, metric: Metric) -> String {
    match metric {
        Metric::Rmse => format!("{}_RMSE", set.prefix()),
        other => format!("{} {}", set.prefix(), other.label()),
    }
}

fn push_block(schema: &mut TableSchemaBuilder, set: EvaluationSet, category: ModelCategory) {
    for metric in block_metrics(set, category) {
        schema.push(column_name(set, metric), ColumnType::Double, METRIC_FORMAT);
    }
}

/// The evaluation sets that get a column block, in column order.
fn scored_sets(history: &ScoringHistory) -> Vec<EvaluationSet> {
    let mut sets = vec![EvaluationSet::Training];
    if history.has_validation() {
        sets.push(EvaluationSet::Validation);
    }
    if history.has_cross_validation() {
        sets.push(EvaluationSet::CrossValidation);
    }
    sets
}

/// The frozen scoring-history schema for a category and the scored evaluation sets.
pub fn scoring_history_schema(
    category: ModelCategory,
    has_validation: bool,
    has_cross_validation: bool,
) -> TableSchema {
    let mut schema = TableSchemaBuilder::new();
    schema
        .push("Timestamp", ColumnType::Str, "%s")
        .push("Duration", ColumnType::Str, "%s")
        .push("Evaluation_Iterations", ColumnType::Int, "%d")
        .push("Training RMSE", ColumnType::Double, METRIC_FORMAT);
    push_block(&mut schema, EvaluationSet::Training, category);
    if has_validation {
        push_block(&mut schema, EvaluationSet::Validation, category);
    }
    if has_cross_validation {
        push_block(&mut schema, EvaluationSet::CrossValidation, category);
    }
    schema.freeze()
}

/// Builds the "Scoring History" table, or `None` when no training checkpoint was recorded.
///
/// Validation and cross-validation lists shorter than the training list
/// leave NaN in their block for the missing rows.
pub fn build_scoring_history_table(
    history: &ScoringHistory,
    category: ModelCategory,
) -> Option<TwoDimTable> {
    if history.training.is_empty() {
        return None;
    }
    assert_eq!(
        history.training_time_ms.len(),
        history.training.len(),
        "one checkpoint time per training score"
    );

    let sets = scored_sets(history);
    let schema = scoring_history_schema(
        category,
        history.has_validation(),
        history.has_cross_validation(),
    );
    let columns = schema.column_count();
    let rows = history.training.len();
    let mut table = TwoDimTable::new("Scoring History", "", vec![String::new(); rows], schema, "");

    for (row, (training, &time_ms)) in history
        .training
        .iter()
        .zip(&history.training_time_ms)
        .enumerate()
    {
        if let Some(timestamp) = format_timestamp(time_ms) {
            table.set(row, 0, timestamp);
        }
        table.set(row, 1, format_elapsed(time_ms.saturating_sub(history.start_time_ms)));
        table.set(row, 2, row as i64);
        table.set(row, 3, training.rmse);

        let mut col = 4;
        for &set in &sets {
            let score = match set {
                EvaluationSet::Training => Some(training),
                EvaluationSet::Validation => history.validation.get(row),
                EvaluationSet::CrossValidation => history.cross_validation.get(row),
            };
            for metric in block_metrics(set, category) {
                table.set(row, col, score.map_or(f64::NAN, |s| metric.value(s)));
                col += 1;
            }
        }
        assert_eq!(col, columns, "scoring history row {row} left columns unfilled");
    }
    Some(table)
}

/// Formats epoch milliseconds as `yyyy-MM-dd HH:mm:ss` in the local time zone.
pub fn format_timestamp(epoch_ms: i64) -> Option<String> {
    let utc = DateTime::from_timestamp_millis(epoch_ms)?;
    Some(utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string())
}

/// Formats elapsed milliseconds the way build durations are reported:
/// ` 1:02:03.004` past an hour, ` 2 min  3.004 sec` past a minute,
/// ` 0.250 sec` otherwise. Negative durations read as zero.
pub fn format_elapsed(elapsed_ms: i64) -> String {
    let total = elapsed_ms.max(0);
    let hours = total / 3_600_000;
    let minutes = (total / 60_000) % 60;
    let seconds = (total / 1_000) % 60;
    let millis = total % 1_000;
    if hours != 0 {
        format!("{hours:2}:{minutes:02}:{seconds:02}.{millis:03}")
    } else if minutes != 0 {
        format!("{minutes:2} min {seconds:2}.{millis:03} sec")
    } else {
        format!("{seconds:2}.{millis:03} sec")
    }
}

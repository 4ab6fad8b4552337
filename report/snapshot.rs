use crate::types::{CoefficientVector, ModelCategory, ScoreSnapshot};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// --- Public Data Structures ---
// These structs define the human-readable snapshot of a fitted GLM that the
// table builders read from. They are serialized to and from TOML.

/// Standard errors, z-values and p-values, one entry per coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceStats {
    pub std_err: Array1<f64>,
    pub z_values: Array1<f64>,
    pub p_values: Array1<f64>,
}

/// Per-checkpoint evaluation history collected while the model was scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringHistory {
    /// Model build start, epoch milliseconds.
    #[serde(default)]
    pub start_time_ms: i64,
    /// Wall-clock time of every training checkpoint, epoch milliseconds.
    #[serde(default)]
    pub training_time_ms: Vec<i64>,
    #[serde(default)]
    pub training: Vec<ScoreSnapshot>,
    /// Empty when no validation frame was scored.
    #[serde(default)]
    pub validation: Vec<ScoreSnapshot>,
    /// Empty when no cross-validation metrics were collected.
    #[serde(default)]
    pub cross_validation: Vec<ScoreSnapshot>,
}

impl ScoringHistory {
    pub fn has_validation(&self) -> bool {
        !self.validation.is_empty()
    }

    pub fn has_cross_validation(&self) -> bool {
        !self.cross_validation.is_empty()
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// The immutable, fully-scored state of a fitted GLM.
///
/// Coefficient vectors follow fitting order: predictors first, the intercept
/// last. `coefficient_names` is parallel to them. A single-response model
/// carries `beta`; a multinomial or ordinal model carries `beta_multinomial`
/// with one row per response class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlmSnapshot {
    pub model_category: ModelCategory,

    // Scalar summaries, passed through to the output unchanged.
    #[serde(default = "nan")]
    pub lambda_best: f64,
    #[serde(default = "nan")]
    pub lambda_1se: f64,
    #[serde(default = "nan")]
    pub dispersion: f64,

    pub coefficient_names: Vec<String>,
    /// Response levels, in class-index order.
    #[serde(default)]
    pub response_domain: Vec<String>,
    #[serde(default)]
    pub random_coefficient_names: Option<Vec<String>>,

    #[serde(default)]
    pub beta: Option<CoefficientVector>,
    #[serde(default)]
    pub standardized_beta: Option<CoefficientVector>,
    #[serde(default)]
    pub significance: Option<SignificanceStats>,

    /// Shape `[n_classes, n_coefficients]`.
    #[serde(default)]
    pub beta_multinomial: Option<Array2<f64>>,
    #[serde(default)]
    pub standardized_beta_multinomial: Option<Array2<f64>>,

    /// HGLM random-effect estimates, parallel to `random_coefficient_names`.
    #[serde(default)]
    pub random_coefficients: Option<Array1<f64>>,

    #[serde(default)]
    pub scoring_history: ScoringHistory,
}

/// Custom error type for snapshot loading, saving and validation.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read or write snapshot file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML snapshot file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize snapshot to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("'{field}' has length {found}, but {expected} entries were expected.")]
    ShapeMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("The model has {classes} response classes but the response domain lists {found} names.")]
    MissingClassNames { classes: usize, found: usize },
    #[error("A coefficient vector needs at least an intercept, but no coefficient names were given.")]
    NoCoefficientNames,
}

/// The two coefficient layouts a snapshot can present.
#[derive(Debug, Clone, Copy)]
pub enum CoefficientPresentation<'a> {
    Single {
        beta: ArrayView1<'a, f64>,
        standardized: Option<ArrayView1<'a, f64>>,
        significance: Option<&'a SignificanceStats>,
    },
    PerClass {
        beta: ArrayView2<'a, f64>,
        standardized: Option<ArrayView2<'a, f64>>,
        class_names: &'a [String],
    },
}

impl GlmSnapshot {
    /// Whether coefficients are laid out per response class.
    pub fn is_per_class(&self) -> bool {
        self.model_category.has_per_class_coefficients()
    }

    /// The coefficient layout matching the model category, or `None` when the
    /// model has no coefficients yet.
    pub fn presentation(&self) -> Option<CoefficientPresentation<'_>> {
        if self.is_per_class() {
            let beta = self.beta_multinomial.as_ref()?;
            Some(CoefficientPresentation::PerClass {
                beta: beta.view(),
                standardized: self.standardized_beta_multinomial.as_ref().map(Array2::view),
                class_names: &self.response_domain,
            })
        } else {
            let beta = self.beta.as_ref()?;
            Some(CoefficientPresentation::Single {
                beta: beta.as_view(),
                standardized: self.standardized_beta.as_ref().map(CoefficientVector::as_view),
                significance: self.significance.as_ref(),
            })
        }
    }

    /// Checks every shape invariant the table builders rely on.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let expected = self.coefficient_names.len();
        if expected == 0 {
            return Err(SnapshotError::NoCoefficientNames);
        }
        let check = |field: &'static str, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(SnapshotError::ShapeMismatch {
                    field,
                    found,
                    expected,
                })
            }
        };

        if let Some(beta) = &self.beta {
            check("beta", beta.len())?;
        }
        if let Some(beta) = &self.standardized_beta {
            check("standardized_beta", beta.len())?;
        }
        if let Some(stats) = &self.significance {
            check("significance.std_err", stats.std_err.len())?;
            check("significance.z_values", stats.z_values.len())?;
            check("significance.p_values", stats.p_values.len())?;
        }

        if let Some(beta) = &self.beta_multinomial {
            check("beta_multinomial", beta.ncols())?;
            if let Some(standardized) = &self.standardized_beta_multinomial {
                check("standardized_beta_multinomial", standardized.ncols())?;
                if standardized.nrows() != beta.nrows() {
                    return Err(SnapshotError::ShapeMismatch {
                        field: "standardized_beta_multinomial classes",
                        found: standardized.nrows(),
                        expected: beta.nrows(),
                    });
                }
            }
            let classes = beta.nrows();
            if self.is_per_class() && classes > 2 && self.response_domain.len() < classes {
                return Err(SnapshotError::MissingClassNames {
                    classes,
                    found: self.response_domain.len(),
                });
            }
        }

        if let (Some(values), Some(names)) =
            (&self.random_coefficients, &self.random_coefficient_names)
        {
            if values.len() != names.len() {
                return Err(SnapshotError::ShapeMismatch {
                    field: "random_coefficients",
                    found: values.len(),
                    expected: names.len(),
                });
            }
        }

        let history = &self.scoring_history;
        if history.training_time_ms.len() != history.training.len() {
            return Err(SnapshotError::ShapeMismatch {
                field: "scoring_history.training_time_ms",
                found: history.training_time_ms.len(),
                expected: history.training.len(),
            });
        }
        Ok(())
    }

    /// Saves the snapshot in a human-readable TOML format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Loads a snapshot from a TOML file. The result is not yet validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let toml_string = fs::read_to_string(path)?;
        let snapshot = toml::from_str(&toml_string)?;
        Ok(snapshot)
    }
}

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A coefficient vector in fitting order: predictor weights first, intercept last.
#[repr(transparent)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientVector(pub Array1<f64>);

impl CoefficientVector {
    pub fn as_view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }
}

impl Deref for CoefficientVector {
    type Target = Array1<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Array1<f64>> for CoefficientVector {
    fn from(values: Array1<f64>) -> Self {
        Self(values)
    }
}

/// The problem type a model was fitted for. Gates which scoring metrics are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelCategory {
    Unknown,
    Binomial,
    Multinomial,
    Ordinal,
    Regression,
    #[serde(rename = "HGLM")]
    Hglm,
    Clustering,
    AutoEncoder,
    DimReduction,
    CoxPH,
    AnomalyDetection,
    BinomialUplift,
}

impl ModelCategory {
    /// Binomial, multinomial and ordinal responses are scored as classifiers.
    pub fn is_classifier(self) -> bool {
        matches!(
            self,
            ModelCategory::Binomial | ModelCategory::Multinomial | ModelCategory::Ordinal
        )
    }

    /// Whether coefficients are laid out per response class.
    pub fn has_per_class_coefficients(self) -> bool {
        matches!(self, ModelCategory::Multinomial | ModelCategory::Ordinal)
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelCategory::Unknown => "Unknown",
            ModelCategory::Binomial => "Binomial",
            ModelCategory::Multinomial => "Multinomial",
            ModelCategory::Ordinal => "Ordinal",
            ModelCategory::Regression => "Regression",
            ModelCategory::Hglm => "HGLM",
            ModelCategory::Clustering => "Clustering",
            ModelCategory::AutoEncoder => "AutoEncoder",
            ModelCategory::DimReduction => "DimReduction",
            ModelCategory::CoxPH => "CoxPH",
            ModelCategory::AnomalyDetection => "AnomalyDetection",
            ModelCategory::BinomialUplift => "BinomialUplift",
        };
        f.write_str(name)
    }
}

/// Sign attached to a ranked coefficient magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "POS")]
    Pos,
    #[serde(rename = "NEG")]
    Neg,
}

impl Sign {
    /// `POS` for values `>= 0`, `NEG` otherwise (NaN included).
    pub fn of(value: f64) -> Self {
        if value >= 0.0 { Sign::Pos } else { Sign::Neg }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Pos => "POS",
            Sign::Neg => "NEG",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Evaluation metrics captured at one scoring checkpoint.
///
/// Fields a model category does not produce stay NaN. Omitted fields in a
/// snapshot file deserialize to NaN as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    #[serde(default = "nan")]
    pub rmse: f64,
    #[serde(default = "nan")]
    pub mean_residual_deviance: f64,
    #[serde(default = "nan")]
    pub mae: f64,
    #[serde(default = "nan")]
    pub r2: f64,
    #[serde(default = "nan")]
    pub logloss: f64,
    #[serde(default = "nan")]
    pub auc: f64,
    #[serde(default = "nan")]
    pub pr_auc: f64,
    #[serde(default = "nan")]
    pub lift: f64,
    #[serde(default = "nan")]
    pub classification_error: f64,
}

impl Default for ScoreSnapshot {
    fn default() -> Self {
        Self {
            rmse: f64::NAN,
            mean_residual_deviance: f64::NAN,
            mae: f64::NAN,
            r2: f64::NAN,
            logloss: f64::NAN,
            auc: f64::NAN,
            pr_auc: f64::NAN,
            lift: f64::NAN,
            classification_error: f64::NAN,
        }
    }
}

//! Domain primitives for diagnostic accuracy and inter-rater agreement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{DiagError, DiagResult};

/// Outcome counts of a diagnostic test against a reference standard.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfusionCount {
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ConfusionCount {
    pub fn new(tp: u64, tn: u64, fp: u64, fn_: u64) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Build a count from signed wire values, naming the first negative field.
    pub fn from_signed(tp: i64, tn: i64, fp: i64, fn_: i64) -> DiagResult<Self> {
        fn non_negative(field: &'static str, value: i64) -> DiagResult<u64> {
            u64::try_from(value)
                .map_err(|_| DiagError::invalid(field, format!("must be >= 0, got {value}")))
        }

        Ok(Self {
            true_positives: non_negative("true_positives", tp)?,
            true_negatives: non_negative("true_negatives", tn)?,
            false_positives: non_negative("false_positives", fp)?,
            false_negatives: non_negative("false_negatives", fn_)?,
        })
    }

    /// Total sample size; fails when the four counts do not fit in a `u64`.
    pub fn total(&self) -> DiagResult<u64> {
        [self.true_negatives, self.false_positives, self.false_negatives]
            .into_iter()
            .try_fold(self.true_positives, u64::checked_add)
            .ok_or_else(|| DiagError::invalid("confusion_matrix", "total sample size overflows"))
    }

    // Subtotals saturate; they are exact whenever `total` succeeds.

    /// Subjects with the condition according to the reference standard.
    pub fn condition_positive(&self) -> u64 {
        self.true_positives.saturating_add(self.false_negatives)
    }

    pub fn condition_negative(&self) -> u64 {
        self.true_negatives.saturating_add(self.false_positives)
    }

    pub fn test_positive(&self) -> u64 {
        self.true_positives.saturating_add(self.false_positives)
    }

    pub fn test_negative(&self) -> u64 {
        self.true_negatives.saturating_add(self.false_negatives)
    }

    /// Subjects the test classified correctly.
    pub fn correct(&self) -> u64 {
        self.true_positives.saturating_add(self.true_negatives)
    }
}

/// Point estimate of a proportion with its confidence interval.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Set when the metric's denominator was zero; value and bounds are then 0.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub undefined: bool,
}

impl MetricResult {
    /// Result reported for a metric whose denominator is zero.
    pub const UNDEFINED: Self = Self {
        value: 0.0,
        ci_lower: 0.0,
        ci_upper: 0.0,
        undefined: true,
    };
}

/// The five diagnostic metrics that always travel together.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    pub sensitivity: MetricResult,
    pub specificity: MetricResult,
    pub ppv: MetricResult,
    pub npv: MetricResult,
    pub accuracy: MetricResult,
}

impl MetricBundle {
    pub fn get(&self, name: MetricName) -> &MetricResult {
        match name {
            MetricName::Sensitivity => &self.sensitivity,
            MetricName::Specificity => &self.specificity,
            MetricName::Ppv => &self.ppv,
            MetricName::Npv => &self.npv,
            MetricName::Accuracy => &self.accuracy,
        }
    }
}

/// Names of the bundled metrics, in reporting order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricName {
    Sensitivity,
    Specificity,
    Ppv,
    Npv,
    Accuracy,
}

impl MetricName {
    pub const ALL: [MetricName; 5] = [
        MetricName::Sensitivity,
        MetricName::Specificity,
        MetricName::Ppv,
        MetricName::Npv,
        MetricName::Accuracy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Sensitivity => "sensitivity",
            MetricName::Specificity => "specificity",
            MetricName::Ppv => "ppv",
            MetricName::Npv => "npv",
            MetricName::Accuracy => "accuracy",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the metric calculator for one confusion count.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiagnosticMetrics {
    pub metrics: MetricBundle,
    pub prevalence: f64,
}

/// Two raters' labels for the same ordered set of subjects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KappaInput {
    pub rater1: Vec<String>,
    pub rater2: Vec<String>,
    pub confidence_level: f64,
    pub description: Option<String>,
}

/// Landis-Koch style reading of a kappa value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interpretation {
    Poor,
    Slight,
    Fair,
    Moderate,
    Substantial,
    #[serde(rename = "Almost Perfect")]
    AlmostPerfect,
}

impl Interpretation {
    /// Band containing `kappa`; each band includes its lower bound.
    pub fn from_kappa(kappa: f64) -> Self {
        if kappa < 0.0 {
            Interpretation::Poor
        } else if kappa < 0.20 {
            Interpretation::Slight
        } else if kappa < 0.40 {
            Interpretation::Fair
        } else if kappa < 0.60 {
            Interpretation::Moderate
        } else if kappa < 0.80 {
            Interpretation::Substantial
        } else {
            Interpretation::AlmostPerfect
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::Poor => "Poor",
            Interpretation::Slight => "Slight",
            Interpretation::Fair => "Fair",
            Interpretation::Moderate => "Moderate",
            Interpretation::Substantial => "Substantial",
            Interpretation::AlmostPerfect => "Almost Perfect",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cohen's kappa with its interval and the agreement terms it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KappaResult {
    pub kappa: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub observed_agreement: f64,
    pub expected_agreement: f64,
    pub sample_size: u64,
    pub interpretation: Interpretation,
    pub confidence_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Square co-occurrence table of two raters over `categories`.
///
/// Rows follow rater 1, columns rater 2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContingencyTable {
    pub categories: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn n(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn diagonal(&self) -> u64 {
        (0..self.categories.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn row_total(&self, i: usize) -> u64 {
        self.counts[i].iter().sum()
    }

    pub fn column_total(&self, j: usize) -> u64 {
        self.counts.iter().map(|row| row[j]).sum()
    }
}

//! Named level measurements and the linear weighting that turns them into a
//! scalar fitness.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EvaluationError;

/// Identifier of one level-quality measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricName {
    MeaningfulJumpVariance,
    NegativeSpace,
    PathPercentage,
    EmptyPercentage,
    Linearity,
    Solvability,
}

impl MetricName {
    pub const ALL: [Self; 6] = [
        Self::MeaningfulJumpVariance,
        Self::NegativeSpace,
        Self::PathPercentage,
        Self::EmptyPercentage,
        Self::Linearity,
        Self::Solvability,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MeaningfulJumpVariance => "meaningfulJumpVariance",
            Self::NegativeSpace => "negativeSpace",
            Self::PathPercentage => "pathPercentage",
            Self::EmptyPercentage => "emptyPercentage",
            Self::Linearity => "linearity",
            Self::Solvability => "solvability",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| EvaluationError::UnknownMetric { name: s.to_owned() })
    }
}

/// Measurements produced for one level, keyed by metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements {
    values: BTreeMap<MetricName, f32>,
}

impl Measurements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: MetricName, value: f32) {
        self.values.insert(metric, value);
    }

    #[must_use]
    pub fn get(&self, metric: MetricName) -> Option<f32> {
        self.values.get(&metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(MetricName, f32)> for Measurements {
    fn from_iter<T: IntoIterator<Item = (MetricName, f32)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Linear coefficients combining [`Measurements`] into one fitness value.
///
/// ```
/// use levelforge_evaluator::metric::{FitnessWeights, Measurements, MetricName};
///
/// let weights = FitnessWeights::default();
/// let measurements = MetricName::ALL.into_iter().map(|m| (m, 1.0)).collect::<Measurements>();
/// let fitness = weights.combine(&measurements).unwrap();
/// assert!((fitness - 3.7).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessWeights {
    pub meaningful_jump_variance: f32,
    pub negative_space: f32,
    pub path_percentage: f32,
    pub empty_percentage: f32,
    pub linearity: f32,
    pub solvability: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            meaningful_jump_variance: 0.5,
            negative_space: 0.6,
            path_percentage: 0.5,
            empty_percentage: 0.6,
            linearity: -0.5,
            solvability: 2.0,
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub const fn weight(&self, metric: MetricName) -> f32 {
        match metric {
            MetricName::MeaningfulJumpVariance => self.meaningful_jump_variance,
            MetricName::NegativeSpace => self.negative_space,
            MetricName::PathPercentage => self.path_percentage,
            MetricName::EmptyPercentage => self.empty_percentage,
            MetricName::Linearity => self.linearity,
            MetricName::Solvability => self.solvability,
        }
    }

    /// Weighted sum over all six metrics.
    ///
    /// Every metric must be present; extra entries are ignored.
    pub fn combine(&self, measurements: &Measurements) -> Result<f32, EvaluationError> {
        MetricName::ALL.into_iter().try_fold(0.0, |acc, metric| {
            let value = measurements
                .get(metric)
                .ok_or(EvaluationError::MissingMetric { metric })?;
            Ok(acc + self.weight(metric) * value)
        })
    }
}

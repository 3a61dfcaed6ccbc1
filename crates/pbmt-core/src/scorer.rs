use std::collections::HashMap;

use crate::featurizer::FeatureValue;
use crate::settings::Settings;

/// Reduces a set of feature contributions to one score increment.
pub trait Scorer: Send + Sync {
    fn incremental_score(&self, features: &[FeatureValue]) -> f64;
}

/// Dot product of feature values with a sparse weight vector.
/// Features without a weight contribute nothing.
#[derive(Debug, Clone, Default)]
pub struct LinearScorer {
    weights: HashMap<String, f64>,
}

impl LinearScorer {
    pub fn new(weights: HashMap<String, f64>) -> Self {
        Self { weights }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, w)| (name.to_string(), w))
                .collect(),
        )
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.weights.clone())
    }

    pub fn weight(&self, feature: &str) -> f64 {
        self.weights.get(feature).copied().unwrap_or(0.0)
    }
}

impl Scorer for LinearScorer {
    fn incremental_score(&self, features: &[FeatureValue]) -> f64 {
        features
            .iter()
            .map(|f| self.weight(&f.name) * f.value)
            .sum()
    }
}

use std::sync::Arc;

use crate::coverage::CoverageSet;
use crate::featurizer::{CombinedFeaturizer, FeatureValue, RuleContext};
use crate::scorer::Scorer;

use super::Rule;

/// A rule grounded at a specific source position of one sentence.
///
/// Created once per (rule, span) candidate and shared by every hypothesis
/// that applies it. Rule-level feature values are computed here so that
/// hypothesis expansion only pays for derivation-dependent features.
#[derive(Debug, Clone)]
pub struct ConcreteRule {
    pub rule: Arc<Rule>,
    pub sentence_id: usize,
    /// First source position covered.
    pub source_position: usize,
    pub coverage: CoverageSet,
    /// Rule features that take part in derivation scoring.
    pub cached_features: Vec<FeatureValue>,
    /// Score of the rule outside any derivation, isolation-only features included.
    pub isolation_score: f64,
}

impl ConcreteRule {
    pub fn new(
        rule: Arc<Rule>,
        source_position: usize,
        sentence_len: usize,
        sentence_id: usize,
        featurizer: &CombinedFeaturizer,
        scorer: &dyn Scorer,
    ) -> Self {
        let end = source_position + rule.source.len();
        debug_assert!(end <= sentence_len, "rule span {source_position}..{end} past sentence end");
        let features = featurizer.rule_featurize(&RuleContext::of(&rule, sentence_id));
        let isolation_score = scorer.incremental_score(&features.all);
        Self {
            coverage: CoverageSet::with_range(sentence_len, source_position..end),
            rule,
            sentence_id,
            source_position,
            cached_features: features.cached,
            isolation_score,
        }
    }

    /// Exclusive end of the covered source span.
    pub fn source_end(&self) -> usize {
        self.source_position + self.rule.source.len()
    }

    /// Jump distance from the end of this rule's span to the start of `next`.
    pub fn linear_distortion(&self, next: &ConcreteRule) -> usize {
        self.source_end().abs_diff(next.source_position)
    }
}

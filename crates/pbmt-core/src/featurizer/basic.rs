use super::{DerivationFeaturizer, FeatureValue, Featurizable, RuleContext, RuleFeaturizer};
use crate::rule::GAP_TOKEN;

pub const TM_PREFIX: &str = "TM:";
pub const LINEAR_DISTORTION: &str = "LinearDistortion";
pub const WORD_PENALTY: &str = "WordPenalty";

/// The rule's own table scores as `TM:<score name>` features.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationModel;

impl RuleFeaturizer for TranslationModel {
    fn rule_featurize(&self, ctx: &RuleContext<'_>) -> Vec<FeatureValue> {
        ctx.rule
            .named_scores()
            .map(|(name, score)| FeatureValue::new(format!("{TM_PREFIX}{name}"), score as f64))
            .collect()
    }
}

/// Source-side jump length of the step.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDistortion;

impl DerivationFeaturizer for LinearDistortion {
    fn featurize(&self, f: &Featurizable<'_>) -> Vec<FeatureValue> {
        vec![FeatureValue::new(LINEAR_DISTORTION, f.linear_distortion as f64)]
    }
}

/// Negated number of target words the rule emits, gap markers excluded.
///
/// A rule-level feature so that it also enters the isolation score the
/// future-cost heuristic is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordPenalty;

impl RuleFeaturizer for WordPenalty {
    fn rule_featurize(&self, ctx: &RuleContext<'_>) -> Vec<FeatureValue> {
        let words = ctx
            .target_phrase
            .iter()
            .filter(|t| &***t != GAP_TOKEN)
            .count();
        vec![FeatureValue::new(WORD_PENALTY, -(words as f64))]
    }
}

//! Feature extraction for grounded rules and derivation steps.
//!
//! Two contracts live here:
//! - [`RuleFeaturizer`] sees only the grounded phrase pair and its sentence
//!   id. Its output is computed once per `ConcreteRule` and cached.
//! - [`DerivationFeaturizer`] sees the step being taken inside a derivation
//!   (distortion, insertion position, pending gap segments) and runs once per
//!   hypothesis expansion.
//!
//! [`CombinedFeaturizer`] holds an ordered list of each.

mod basic;
mod domain;
mod rule_shape;

pub use basic::{
    LinearDistortion, TranslationModel, WordPenalty, LINEAR_DISTORTION, TM_PREFIX, WORD_PENALTY,
};
pub use domain::{DomainTable, DomainTableError};
pub use rule_shape::RuleShape;

use std::sync::Arc;

use serde::Serialize;

use crate::phrase::Phrase;
use crate::rule::Rule;
use crate::settings::FeatureSettings;

/// One named real-valued feature contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub name: String,
    pub value: f64,
}

impl FeatureValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The grounded rule as seen by a [`RuleFeaturizer`].
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub sentence_id: usize,
    pub source_phrase: &'a Phrase,
    pub target_phrase: &'a Phrase,
    pub rule: &'a Rule,
}

/// One derivation step as seen by a [`DerivationFeaturizer`].
#[derive(Debug, Clone, Copy)]
pub struct Featurizable<'a> {
    pub sentence_id: usize,
    pub rule: &'a Rule,
    pub source_phrase: &'a Phrase,
    /// Target emitted by this step; a single segment for gap-fill steps.
    pub target_phrase: &'a Phrase,
    pub source_position: usize,
    pub insertion_position: usize,
    pub linear_distortion: usize,
    pub untranslated_tokens: usize,
    pub has_pending_phrases: bool,
    /// Which target segment of a discontinuous rule this step emits.
    pub segment_index: Option<usize>,
}

impl<'a> RuleContext<'a> {
    /// Context for a rule applied with its full target.
    pub fn of(rule: &'a Rule, sentence_id: usize) -> Self {
        Self {
            sentence_id,
            source_phrase: &rule.source,
            target_phrase: &rule.target,
            rule,
        }
    }
}

impl<'a> Featurizable<'a> {
    pub fn rule_context(&self) -> RuleContext<'a> {
        RuleContext {
            sentence_id: self.sentence_id,
            source_phrase: self.source_phrase,
            target_phrase: self.target_phrase,
            rule: self.rule,
        }
    }
}

/// Stateless features of a grounded rule.
///
/// Implementations must be pure: identical inputs give identical outputs and
/// nothing about previous calls or hypothesis history may leak in.
pub trait RuleFeaturizer: Send + Sync {
    fn rule_featurize(&self, ctx: &RuleContext<'_>) -> Vec<FeatureValue>;

    /// Features only meaningful when a rule is scored outside any derivation
    /// (e.g. table pruning). They count towards the isolation score but are
    /// left out of in-derivation accumulation.
    fn isolation_score_only(&self) -> bool {
        false
    }
}

/// Features of a single derivation step.
pub trait DerivationFeaturizer: Send + Sync {
    fn featurize(&self, f: &Featurizable<'_>) -> Vec<FeatureValue>;
}

/// Rule features split by where they are used.
#[derive(Debug, Default)]
pub struct RuleFeatures {
    /// Accumulated during derivation scoring.
    pub cached: Vec<FeatureValue>,
    /// Everything, for the isolation score.
    pub all: Vec<FeatureValue>,
}

#[derive(Default)]
pub struct CombinedFeaturizer {
    rule_featurizers: Vec<Box<dyn RuleFeaturizer>>,
    derivation_featurizers: Vec<Box<dyn DerivationFeaturizer>>,
}

impl CombinedFeaturizer {
    pub fn new(
        rule_featurizers: Vec<Box<dyn RuleFeaturizer>>,
        derivation_featurizers: Vec<Box<dyn DerivationFeaturizer>>,
    ) -> Self {
        Self {
            rule_featurizers,
            derivation_featurizers,
        }
    }

    /// Build the featurizer set enabled in `[features]`, loading the domain
    /// table if one is configured.
    pub fn from_settings(settings: &FeatureSettings) -> Result<Self, DomainTableError> {
        let mut rule: Vec<Box<dyn RuleFeaturizer>> = Vec::new();
        let mut derivation: Vec<Box<dyn DerivationFeaturizer>> = Vec::new();
        if settings.translation_model {
            rule.push(Box::new(TranslationModel));
        }
        if settings.word_penalty {
            rule.push(Box::new(WordPenalty));
        }
        if settings.rule_shape {
            let shape = match &settings.domain_file {
                Some(path) => RuleShape::with_domains(Arc::new(DomainTable::open(path)?)),
                None => RuleShape::new(),
            };
            rule.push(Box::new(shape));
        }
        if settings.linear_distortion {
            derivation.push(Box::new(LinearDistortion));
        }
        Ok(Self::new(rule, derivation))
    }

    pub fn rule_featurize(&self, ctx: &RuleContext<'_>) -> RuleFeatures {
        let mut out = RuleFeatures::default();
        for featurizer in &self.rule_featurizers {
            let values = featurizer.rule_featurize(ctx);
            if !featurizer.isolation_score_only() {
                out.cached.extend(values.iter().cloned());
            }
            out.all.extend(values);
        }
        out
    }

    pub fn list_featurize(&self, f: &Featurizable<'_>) -> Vec<FeatureValue> {
        self.derivation_featurizers
            .iter()
            .flat_map(|featurizer| featurizer.featurize(f))
            .collect()
    }

    pub fn rule_featurizer_count(&self) -> usize {
        self.rule_featurizers.len()
    }

    pub fn derivation_featurizer_count(&self) -> usize {
        self.derivation_featurizers.len()
    }
}

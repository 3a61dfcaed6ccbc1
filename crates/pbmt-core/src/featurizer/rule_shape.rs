use std::sync::Arc;

use super::{DomainTable, FeatureValue, RuleContext, RuleFeaturizer};

const FEATURE_NAME: &str = "RSHP";

/// Shape of the translation rule: `RSHP:<source len>-<target len>`.
///
/// With a domain table, sentences that carry a label get a second feature
/// refining the shape by domain, e.g. `RSHP:2-3-news`.
#[derive(Debug, Clone, Default)]
pub struct RuleShape {
    domains: Option<Arc<DomainTable>>,
}

impl RuleShape {
    pub fn new() -> Self {
        Self { domains: None }
    }

    pub fn with_domains(domains: Arc<DomainTable>) -> Self {
        Self {
            domains: Some(domains),
        }
    }
}

impl RuleFeaturizer for RuleShape {
    fn rule_featurize(&self, ctx: &RuleContext<'_>) -> Vec<FeatureValue> {
        let shape = format!(
            "{FEATURE_NAME}:{}-{}",
            ctx.source_phrase.len(),
            ctx.target_phrase.len()
        );
        let domain = self
            .domains
            .as_deref()
            .and_then(|d| d.label(ctx.sentence_id));
        let refined = domain.map(|label| FeatureValue::new(format!("{shape}-{label}"), 1.0));
        std::iter::once(FeatureValue::new(shape, 1.0))
            .chain(refined)
            .collect()
    }
}

//! Rule generators and per-sentence grounding of their output.
//!
//! A [`RuleGenerator`] proposes abstract rules for a source token sequence.
//! [`ground_sentence`] queries a list of generators over every span of a
//! sentence and turns the answers into shared [`ConcreteRule`]s.

mod table;
mod unknown;

pub use table::{MemoryRuleTable, RuleTableError};
pub use unknown::{is_ascii_word, is_numeric_like, UnknownWordGenerator};

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::featurizer::CombinedFeaturizer;
use crate::phrase::Phrase;
use crate::rule::{ConcreteRule, Rule};
use crate::scorer::Scorer;

pub trait RuleGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Candidate rules whose source side is `sequence`. May be empty.
    fn translation_options(&self, sequence: &Phrase) -> Vec<Arc<Rule>>;

    /// Longest source phrase any rule of this generator consumes.
    ///
    /// Fallback generators that only ever propose single-token rules report
    /// `-i32::MAX` so they are consulted last.
    fn longest_source_phrase(&self) -> i32;

    /// Per-sentence hook, called before any lookup for `source`.
    fn set_current_sequence(&self, _source: &Phrase, _candidate_translations: &[Phrase]) {}
}

/// Sentence-level filter deciding whether a sequence may receive rules.
pub trait SequenceFilter: Send + Sync {
    fn accepts(&self, sequence: &Phrase) -> bool;
}

impl<F> SequenceFilter for F
where
    F: Fn(&Phrase) -> bool + Send + Sync,
{
    fn accepts(&self, sequence: &Phrase) -> bool {
        self(sequence)
    }
}

/// All rules grounded for one sentence, grouped by source start position.
#[derive(Debug, Clone, Default)]
pub struct TranslationOptions {
    by_start: Vec<Vec<Arc<ConcreteRule>>>,
}

impl TranslationOptions {
    pub fn new(sentence_len: usize) -> Self {
        Self {
            by_start: vec![Vec::new(); sentence_len],
        }
    }

    pub fn push(&mut self, rule: Arc<ConcreteRule>) {
        let start = rule.source_position;
        self.by_start[start].push(rule);
    }

    pub fn starting_at(&self, pos: usize) -> &[Arc<ConcreteRule>] {
        self.by_start.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConcreteRule>> + '_ {
        self.by_start.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_start.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sentence_len(&self) -> usize {
        self.by_start.len()
    }
}

/// Ground every applicable rule of `generators` in `source`.
///
/// Generators are consulted in descending `longest_source_phrase` order.
/// Those with a positive limit see every span up to that limit. Fallback
/// generators (limit below one) only see single tokens that no earlier
/// generator translated on their own. A token matched only inside longer
/// spans still gets fallback rules, since those spans may overlap.
pub fn ground_sentence(
    source: &Phrase,
    sentence_id: usize,
    generators: &[&dyn RuleGenerator],
    featurizer: &CombinedFeaturizer,
    scorer: &dyn Scorer,
) -> TranslationOptions {
    let n = source.len();
    let _span = debug_span!("ground_sentence", sentence_id, n).entered();

    let mut ordered: Vec<&dyn RuleGenerator> = generators.to_vec();
    ordered.sort_by_key(|g| std::cmp::Reverse(g.longest_source_phrase()));

    let mut options = TranslationOptions::new(n);
    let mut matched = vec![false; n];
    let mut fallback_count = 0usize;

    for generator in ordered {
        generator.set_current_sequence(source, &[]);
        let limit = generator.longest_source_phrase();
        let ground = |rule: Arc<Rule>, start: usize, options: &mut TranslationOptions| {
            options.push(Arc::new(ConcreteRule::new(
                rule,
                start,
                n,
                sentence_id,
                featurizer,
                scorer,
            )));
        };

        if limit >= 1 {
            let limit = limit as usize;
            for start in 0..n {
                for end in start + 1..=(start + limit).min(n) {
                    let rules = generator.translation_options(&source.slice(start..end));
                    if end == start + 1 && !rules.is_empty() {
                        matched[start] = true;
                    }
                    for rule in rules {
                        ground(rule, start, &mut options);
                    }
                }
            }
        } else {
            for start in 0..n {
                if matched[start] {
                    continue;
                }
                let rules = generator.translation_options(&source.slice(start..start + 1));
                if !rules.is_empty() {
                    matched[start] = true;
                    fallback_count += 1;
                }
                for rule in rules {
                    ground(rule, start, &mut options);
                }
            }
        }
    }

    debug!(
        option_count = options.len(),
        fallback_count,
        unmatched = matched.iter().filter(|m| !**m).count()
    );
    options
}

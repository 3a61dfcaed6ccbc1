//! Shared fixtures for hypothesis tests: a toy rule table, a context wired
//! with the basic featurizers, and a greedy monotone driver.

use std::sync::Arc;

use super::{DecodeContext, DecodeSession, HypId};
use crate::annotator::{Annotator, TargetDependencyAnnotator, TargetTagAnnotator};
use crate::featurizer::{
    CombinedFeaturizer, LinearDistortion, RuleShape, TranslationModel, WordPenalty,
    LINEAR_DISTORTION, WORD_PENALTY,
};
use crate::generator::{ground_sentence, MemoryRuleTable, TranslationOptions, UnknownWordGenerator};
use crate::heuristic::SearchHeuristic;
use crate::phrase::Phrase;
use crate::scorer::LinearScorer;

pub(crate) const TOY_TABLE: &str = "\
a ||| x ||| -1
a ||| xx ||| -2
b ||| y ||| -1
b ||| yy ||| -2
c ||| z ||| -0.5
a b ||| w ||| -4
";

pub(crate) fn toy_table() -> MemoryRuleTable {
    MemoryRuleTable::from_text(TOY_TABLE, &["p".to_string()]).unwrap()
}

pub(crate) fn toy_scorer() -> LinearScorer {
    LinearScorer::from_pairs([
        ("TM:p", 1.0),
        ("TM:p_i(t|f)", -10.0),
        (LINEAR_DISTORTION, -0.5),
        (WORD_PENALTY, 0.25),
    ])
}

pub(crate) fn toy_featurizer() -> CombinedFeaturizer {
    CombinedFeaturizer::new(
        vec![
            Box::new(TranslationModel),
            Box::new(WordPenalty),
            Box::new(RuleShape::new()),
        ],
        vec![Box::new(LinearDistortion)],
    )
}

pub(crate) fn toy_context() -> DecodeContext {
    let annotators: Vec<Arc<dyn Annotator>> = vec![
        Arc::new(TargetDependencyAnnotator::new()),
        Arc::new(TargetTagAnnotator::from_pairs([("x", "NN"), ("y", "VB")])),
    ];
    DecodeContext::new(Arc::new(toy_featurizer()), Arc::new(toy_scorer())).with_annotators(annotators)
}

pub(crate) fn toy_options(ctx: &DecodeContext, source: &Phrase, sentence_id: usize) -> TranslationOptions {
    let table = toy_table();
    let unknown = UnknownWordGenerator::new(false);
    ground_sentence(
        source,
        sentence_id,
        &[&table, &unknown],
        &ctx.featurizer,
        ctx.scorer.as_ref(),
    )
}

/// Root session over `sentence`, with the toy options grounded against it.
pub(crate) fn toy_session(
    ctx: &DecodeContext,
    sentence: &str,
    heuristic: Box<dyn SearchHeuristic>,
) -> (DecodeSession, TranslationOptions) {
    let source = Phrase::from_text(sentence);
    let options = toy_options(ctx, &source, 0);
    let session = DecodeSession::new(ctx.clone(), 0, source, heuristic, &options);
    (session, options)
}

/// Follow the best child, always translating the first uncovered position
/// and appending at the end of the target, until a complete hypothesis.
pub(crate) fn monotone_best_first(session: &mut DecodeSession, options: &TranslationOptions) -> HypId {
    let mut current = session.root();
    loop {
        let hyp = session.get(current);
        let Some(pos) = hyp.coverage.first_unset() else {
            return current;
        };
        let length = hyp.length;
        let coverage = hyp.coverage.clone();
        let children: Vec<HypId> = options
            .starting_at(pos)
            .iter()
            .filter(|r| !coverage.intersects(&r.coverage))
            .map(|r| session.extend(current, r, length))
            .collect();
        current = children
            .into_iter()
            .min_by(|a, b| session.get(*a).cmp(session.get(*b)))
            .expect("every position has an option");
    }
}

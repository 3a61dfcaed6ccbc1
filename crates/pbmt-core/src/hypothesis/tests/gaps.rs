use std::sync::Arc;

use crate::heuristic::IsolatedPhraseHeuristic;
use crate::hypothesis::testutil::{toy_context, toy_session};
use crate::hypothesis::TargetUnit;
use crate::phrase::Phrase;
use crate::rule::{ConcreteRule, PhraseAlignment, Rule};

fn gapped_rule(ctx: &crate::hypothesis::DecodeContext) -> Arc<ConcreteRule> {
    let rule = Rule::new(
        Phrase::from_text("a"),
        Phrase::from_text("p [X] q"),
        vec![-1.0],
        vec!["p".to_string()].into(),
        PhraseAlignment::Identity,
    );
    Arc::new(ConcreteRule::new(
        Arc::new(rule),
        0,
        2,
        0,
        &ctx.featurizer,
        ctx.scorer.as_ref(),
    ))
}

#[test]
fn segments_fill_around_a_contiguous_step() {
    let ctx = toy_context();
    let (mut session, options) =
        toy_session(&ctx, "a b", Box::new(IsolatedPhraseHeuristic::new()));
    let gapped = gapped_rule(&ctx);
    let segments = gapped.rule.target_segments();
    assert_eq!(segments.len(), 2);

    let first =
        session.extend_segment(session.root(), &gapped, 0, segments[0].clone(), 0, true);
    let hyp = session.get(first);
    assert_eq!(hyp.coverage.to_string(), "{0}");
    assert!(hyp.has_pending_phrases());
    assert_eq!(hyp.unit, TargetUnit::Segment { index: 0, has_pending: true });
    // TM -1, both target words at 0.25.
    assert_eq!(hyp.score, -1.5);

    let y = options.starting_at(1)[0].clone();
    let middle = session.extend(first, &y, 1);
    let hyp = session.get(middle);
    assert_eq!(hyp.untranslated_tokens, 0);
    assert!(hyp.has_pending_phrases());
    assert!(!hyp.is_done());
    assert!(!hyp.annotations[0].as_dependency().unwrap().is_finalized());

    let last = session.extend_segment(middle, &gapped, 2, segments[1].clone(), 1, false);
    let hyp = session.get(last);
    assert_eq!(hyp.coverage, session.get(middle).coverage);
    assert!(hyp.is_done());
    assert_eq!(hyp.depth, 3);
    assert_eq!(hyp.h, session.get(middle).h);
    assert!(hyp.annotations[0].as_dependency().unwrap().is_finalized());

    // Rule scores count once, on the opening segment.
    let names: Vec<&str> = hyp.local_features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["LinearDistortion"]);
    assert_eq!(hyp.linear_distortion, 2);

    assert_eq!(session.translation(last).to_string(), "p y q");
    let steps = session.derivation(last);
    assert_eq!(steps[0].segment_index, Some(0));
    assert_eq!(steps[2].segment_index, Some(1));
    assert_eq!(steps[2].target, "q");
}

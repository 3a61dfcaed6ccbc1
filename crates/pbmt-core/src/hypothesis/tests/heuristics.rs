use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use crate::coverage::CoverageSet;
use crate::featurizer::CombinedFeaturizer;
use crate::generator::{ground_sentence, MemoryRuleTable, TranslationOptions};
use crate::heuristic::{CancellableHeuristic, IsolatedPhraseHeuristic, SearchHeuristic};
use crate::hypothesis::testutil::{monotone_best_first, toy_context, toy_session, toy_table};
use crate::hypothesis::{DecodeContext, DecodeSession, Hypothesis};
use crate::phrase::Phrase;
use crate::scorer::{LinearScorer, Scorer};
use crate::settings::settings;

#[test]
fn untranslatable_position_is_non_viable_from_the_root() {
    let ctx = toy_context();
    let table = toy_table();
    let source = Phrase::from_text("a q");
    let options = ground_sentence(&source, 0, &[&table], &ctx.featurizer, ctx.scorer.as_ref());
    let mut session = DecodeSession::new(
        ctx.clone(),
        0,
        source,
        Box::new(IsolatedPhraseHeuristic::new()),
        &options,
    );

    let root = session.get(session.root());
    assert_eq!(root.h, f64::NEG_INFINITY);
    assert!(!root.is_viable());

    let child = session.extend(session.root(), &options.starting_at(0)[0], 0);
    let child = session.get(child);
    assert_eq!(child.h, f64::NEG_INFINITY);
    assert_eq!(child.final_score_estimate(), f64::NEG_INFINITY);
    // Score still accumulates normally.
    assert_eq!(child.score, -1.25);
}

#[test]
fn default_weights_keep_the_estimate_optimistic() {
    // Negative WordPenalty weight: every emitted word is a gain the
    // estimate has to include.
    let s = settings();
    let ctx = DecodeContext::new(
        Arc::new(CombinedFeaturizer::from_settings(&s.features).unwrap()),
        Arc::new(LinearScorer::from_settings(s)),
    );
    let table = MemoryRuleTable::from_text(
        "das ||| the ||| -0.2 -0.3 -0.1 -0.2\n\
         haus ||| house ||| -0.3 -0.4 -0.2 -0.3\n\
         ist ||| is ||| -0.1 -0.1 -0.1 -0.1\n",
        &s.table.score_names,
    )
    .unwrap();
    let source = Phrase::from_text("das haus ist");
    let options = ground_sentence(&source, 0, &[&table], &ctx.featurizer, ctx.scorer.as_ref());
    let mut session = DecodeSession::new(
        ctx,
        0,
        source,
        Box::new(IsolatedPhraseHeuristic::new()),
        &options,
    );

    let complete = monotone_best_first(&mut session, &options);
    let complete = session.get(complete);
    assert!(complete.is_done());
    let root = session.get(session.root());
    assert!(
        root.h >= complete.score - 1e-9,
        "root h {} below complete score {}",
        root.h,
        complete.score
    );
    for (_, hyp) in session.arena().iter() {
        assert!(hyp.final_score_estimate() >= complete.score - 1e-9);
    }
}

#[test]
fn cancel_flag_turns_later_children_non_viable() {
    let ctx = toy_context();
    let heuristic = CancellableHeuristic::new(IsolatedPhraseHeuristic::new());
    let flag = heuristic.flag();
    let (mut session, options) = toy_session(&ctx, "a b c", Box::new(heuristic));
    let root = session.root();

    let before = session.extend(root, &options.starting_at(0)[0], 0);
    assert!(session.get(before).is_viable());

    flag.store(true, Ordering::Relaxed);
    let after = session.extend(root, &options.starting_at(0)[1], 0);
    assert!(!session.get(after).is_viable());
    assert!(session.get(before).is_viable());

    let grandchild = session.extend(after, &options.starting_at(1)[0], 1);
    assert_eq!(session.get(grandchild).h, f64::NEG_INFINITY);
}

struct NanHeuristic;

impl SearchHeuristic for NanHeuristic {
    fn initial_heuristic(
        &mut self,
        _source: &Phrase,
        _options: &TranslationOptions,
        _scorer: &dyn Scorer,
        _sentence_id: usize,
    ) -> f64 {
        0.0
    }

    fn heuristic_delta(&self, _child: &Hypothesis, _newly_covered: &CoverageSet) -> f64 {
        f64::NAN
    }
}

#[test]
#[should_panic(expected = "NaN")]
fn nan_heuristic_is_rejected() {
    let ctx = toy_context();
    let (mut session, options) = toy_session(&ctx, "a", Box::new(NanHeuristic));
    session.extend(session.root(), &options.starting_at(0)[0], 0);
}

/// Records what the session reports as newly covered.
struct RecordingHeuristic(Arc<Mutex<Vec<String>>>);

impl SearchHeuristic for RecordingHeuristic {
    fn initial_heuristic(
        &mut self,
        _source: &Phrase,
        _options: &TranslationOptions,
        _scorer: &dyn Scorer,
        _sentence_id: usize,
    ) -> f64 {
        0.0
    }

    fn heuristic_delta(&self, child: &Hypothesis, newly_covered: &CoverageSet) -> f64 {
        let mut seen = self.0.lock().unwrap();
        seen.push(format!("{} {}", child.coverage, newly_covered));
        0.0
    }
}

#[test]
fn delta_sees_finished_child_and_new_positions() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let ctx = toy_context();
    let (mut session, options) =
        toy_session(&ctx, "a b c", Box::new(RecordingHeuristic(seen.clone())));
    let z = session.extend(session.root(), &options.starting_at(2)[0], 0);
    session.extend(z, &options.starting_at(1)[0], 0);

    assert_eq!(*seen.lock().unwrap(), vec!["{2} {2}", "{1, 2} {1}"]);
}

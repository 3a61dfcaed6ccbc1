use std::collections::HashSet;

use crate::heuristic::IsolatedPhraseHeuristic;
use crate::hypothesis::testutil::{monotone_best_first, toy_context, toy_options};
use crate::hypothesis::{DecodeSession, IdSource};
use crate::phrase::Phrase;

fn assert_send<T: Send>() {}
fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn session_types_cross_threads() {
    assert_send::<DecodeSession>();
    assert_send_sync::<crate::hypothesis::DecodeContext>();
    assert_send_sync::<crate::hypothesis::Hypothesis>();
}

#[test]
fn ids_stay_unique_across_parallel_sessions() {
    let ids = IdSource::new();
    let ctx = toy_context().with_ids(ids.clone());
    let sentences = ["a b c", "c b a", "a b", "b c a", "a", "c c c"];

    let per_session: Vec<Vec<u64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = sentences
            .iter()
            .enumerate()
            .map(|(sentence_id, text)| {
                let ctx = ctx.clone();
                scope.spawn(move || {
                    let source = Phrase::from_text(text);
                    let options = toy_options(&ctx, &source, sentence_id);
                    let mut session = DecodeSession::new(
                        ctx,
                        sentence_id,
                        source,
                        Box::new(IsolatedPhraseHeuristic::new()),
                        &options,
                    );
                    monotone_best_first(&mut session, &options);
                    session.arena().iter().map(|(_, h)| h.id).collect::<Vec<u64>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut all = HashSet::new();
    for session_ids in &per_session {
        assert!(session_ids.windows(2).all(|w| w[0] < w[1]), "ids increase within a session");
        for id in session_ids {
            assert!(all.insert(*id), "id {id} handed out twice");
        }
    }
    assert_eq!(all.len() as u64, ids.last_id());
}

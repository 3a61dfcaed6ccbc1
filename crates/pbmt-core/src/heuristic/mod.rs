//! Search heuristics: estimates of the score still to be gained before a
//! derivation covers the whole sentence.
//!
//! Estimates are meant to be optimistic, though nothing here checks it.
//! A non-finite estimate marks a hypothesis as
//! permanently non-viable; expansion propagates it without asking the
//! heuristic again. NaN is never a valid answer.

mod cancel;
mod isolated;

pub use cancel::CancellableHeuristic;
pub use isolated::IsolatedPhraseHeuristic;

use crate::coverage::CoverageSet;
use crate::generator::TranslationOptions;
use crate::hypothesis::Hypothesis;
use crate::phrase::Phrase;
use crate::scorer::Scorer;

/// Per-sentence heuristic. `initial_heuristic` is called exactly once, when
/// the root hypothesis is built, and may cache whatever the deltas need.
pub trait SearchHeuristic: Send {
    fn initial_heuristic(
        &mut self,
        source: &Phrase,
        options: &TranslationOptions,
        scorer: &dyn Scorer,
        sentence_id: usize,
    ) -> f64;

    /// Change of the estimate caused by `child` covering `newly_covered`.
    /// `child` is complete except for its own heuristic value.
    fn heuristic_delta(&self, child: &Hypothesis, newly_covered: &CoverageSet) -> f64;
}

/// Zero everywhere. Turns best-first search into uniform-score search.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHeuristic;

impl SearchHeuristic for NullHeuristic {
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
        0.0
    }
}

impl<H: SearchHeuristic + ?Sized> SearchHeuristic for Box<H> {
    fn initial_heuristic(
        &mut self,
        source: &Phrase,
        options: &TranslationOptions,
        scorer: &dyn Scorer,
        sentence_id: usize,
    ) -> f64 {
        (**self).initial_heuristic(source, options, scorer, sentence_id)
    }

    fn heuristic_delta(&self, child: &Hypothesis, newly_covered: &CoverageSet) -> f64 {
        (**self).heuristic_delta(child, newly_covered)
    }
}

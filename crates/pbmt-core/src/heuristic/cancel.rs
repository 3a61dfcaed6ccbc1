use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::SearchHeuristic;
use crate::coverage::CoverageSet;
use crate::generator::TranslationOptions;
use crate::hypothesis::Hypothesis;
use crate::phrase::Phrase;
use crate::scorer::Scorer;

/// Wraps a heuristic so that a shared flag can stop the search.
///
/// Once the flag is raised every new estimate is `-inf`, which marks all
/// later hypotheses non-viable. The flag is polled, never waited on.
pub struct CancellableHeuristic<H> {
    inner: H,
    cancelled: Arc<AtomicBool>,
}

impl<H: SearchHeuristic> CancellableHeuristic<H> {
    pub fn new(inner: H) -> Self {
        Self::with_flag(inner, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_flag(inner: H, cancelled: Arc<AtomicBool>) -> Self {
        Self { inner, cancelled }
    }

    /// Handle for raising the flag from another thread.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: SearchHeuristic> SearchHeuristic for CancellableHeuristic<H> {
    fn initial_heuristic(
        &mut self,
        source: &Phrase,
        options: &TranslationOptions,
        scorer: &dyn Scorer,
        sentence_id: usize,
    ) -> f64 {
        let h = self
            .inner
            .initial_heuristic(source, options, scorer, sentence_id);
        if self.is_cancelled() {
            f64::NEG_INFINITY
        } else {
            h
        }
    }

    fn heuristic_delta(&self, child: &Hypothesis, newly_covered: &CoverageSet) -> f64 {
        if self.is_cancelled() {
            return f64::NEG_INFINITY;
        }
        self.inner.heuristic_delta(child, newly_covered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::NullHeuristic;
    use crate::scorer::LinearScorer;

    #[test]
    fn raised_flag_makes_initial_estimate_non_viable() {
        let mut h = CancellableHeuristic::new(NullHeuristic);
        let source = Phrase::from_text("a");
        let options = TranslationOptions::new(1);
        let scorer = LinearScorer::default();
        assert_eq!(h.initial_heuristic(&source, &options, &scorer, 0), 0.0);

        let flag = h.flag();
        std::thread::spawn(move || flag.store(true, Ordering::Relaxed))
            .join()
            .unwrap();
        assert!(h.is_cancelled());
        assert_eq!(
            h.initial_heuristic(&source, &options, &scorer, 0),
            f64::NEG_INFINITY
        );
    }
}

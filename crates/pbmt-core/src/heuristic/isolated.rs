use tracing::debug;

use super::SearchHeuristic;
use crate::coverage::CoverageSet;
use crate::generator::TranslationOptions;
use crate::hypothesis::Hypothesis;
use crate::phrase::Phrase;
use crate::scorer::Scorer;

/// Future-score estimate built from the best isolation score of each span.
///
/// `future[s][e]` is the best score of covering `s..e` with non-overlapping
/// rules scored in isolation. The estimate for a coverage set is the sum of
/// `future` over its uncovered gaps. A gap some position of which no rule
/// covers is `-inf`, so hypotheses that can never finish are marked
/// non-viable at once.
#[derive(Debug, Clone, Default)]
pub struct IsolatedPhraseHeuristic {
    future: Vec<Vec<f64>>,
}

impl IsolatedPhraseHeuristic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate for the still-uncovered part of `coverage`.
    pub fn estimate(&self, coverage: &CoverageSet) -> f64 {
        coverage
            .gaps()
            .into_iter()
            .map(|gap| self.future[gap.start][gap.end])
            .sum()
    }
}

impl SearchHeuristic for IsolatedPhraseHeuristic {
    fn initial_heuristic(
        &mut self,
        source: &Phrase,
        options: &TranslationOptions,
        _scorer: &dyn Scorer,
        sentence_id: usize,
    ) -> f64 {
        let n = source.len();
        let mut future = vec![vec![f64::NEG_INFINITY; n + 1]; n + 1];
        for rule in options.iter() {
            let cell = &mut future[rule.source_position][rule.source_end()];
            *cell = cell.max(rule.isolation_score);
        }
        for len in 2..=n {
            for s in 0..=n - len {
                let e = s + len;
                let mut best = future[s][e];
                for k in s + 1..e {
                    best = best.max(future[s][k] + future[k][e]);
                }
                future[s][e] = best;
            }
        }
        self.future = future;

        let h = self.estimate(&CoverageSet::new(n));
        debug!(sentence_id, initial = h);
        h
    }

    fn heuristic_delta(&self, child: &Hypothesis, newly_covered: &CoverageSet) -> f64 {
        let before = self.estimate(&child.coverage.difference(newly_covered));
        if before.is_infinite() {
            return before;
        }
        self.estimate(&child.coverage) - before
    }
}

//! Translation rules: abstract phrase pairs and their sentence-grounded form.

mod alignment;
mod concrete;

pub use alignment::{AlignmentError, PhraseAlignment};
pub use concrete::ConcreteRule;

use std::sync::Arc;

use crate::phrase::{Phrase, Token};

/// Target-side placeholder marking a gap in a discontinuous target unit.
pub const GAP_TOKEN: &str = "[X]";

/// An abstract source→target phrase pair with named scores.
///
/// Rules are owned by whatever table produced them and shared read-only
/// (`Arc<Rule>`) by every grounding and hypothesis that uses them.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub source: Phrase,
    pub target: Phrase,
    pub scores: Arc<[f32]>,
    pub score_names: Arc<[String]>,
    pub alignment: PhraseAlignment,
}

impl Rule {
    pub fn new(
        source: Phrase,
        target: Phrase,
        scores: Vec<f32>,
        score_names: Arc<[String]>,
        alignment: PhraseAlignment,
    ) -> Self {
        debug_assert_eq!(
            scores.len(),
            score_names.len(),
            "score vector and score names differ in length"
        );
        Self {
            source,
            target,
            scores: scores.into(),
            score_names,
            alignment,
        }
    }

    /// `(name, value)` pairs of the rule's own scores.
    pub fn named_scores(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.score_names
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Empty target side.
    pub fn is_deletion(&self) -> bool {
        self.target.is_empty()
    }

    pub fn has_gaps(&self) -> bool {
        self.target.iter().any(|t| &**t == GAP_TOKEN)
    }

    /// Target split on `GAP_TOKEN`. A contiguous rule yields one segment.
    pub fn target_segments(&self) -> Vec<Phrase> {
        let mut segments = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        for tok in self.target.iter() {
            if &**tok == GAP_TOKEN {
                segments.push(Phrase::new(std::mem::take(&mut current)));
            } else {
                current.push(tok.clone());
            }
        }
        segments.push(Phrase::new(current));
        segments
    }
}

//! Partial translation derivations and their expansion.
//!
//! A [`Hypothesis`] records one step of a derivation: the rule applied, the
//! source coverage reached, the score so far and a heuristic estimate of the
//! score still to come. Hypotheses of one sentence live in a
//! [`HypothesisArena`] owned by its [`DecodeSession`] and point to their
//! parent by [`HypId`]. Nothing is mutated after construction.
//!
//! Search control (frontier selection, pruning, recombination) is left to the
//! caller; this module only builds and orders nodes.

mod derivation;
mod session;

#[cfg(test)]
mod tests;
#[cfg(test)]
pub(crate) mod testutil;

pub use derivation::DerivationStep;
pub use session::{DecodeContext, DecodeSession, IdSource};

use std::cmp::Ordering;
use std::ops::Index;
use std::sync::Arc;

use crate::annotator::AnnotatorState;
use crate::coverage::CoverageSet;
use crate::featurizer::FeatureValue;
use crate::phrase::Phrase;
use crate::rule::ConcreteRule;

/// Handle of a hypothesis inside its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HypId(usize);

impl HypId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How the target side of the applied rule was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetUnit {
    /// The rule's whole target at once.
    #[default]
    Contiguous,
    /// One segment of a discontinuous target. `has_pending` is set while later
    /// segments of the same rule are still to be placed; contiguous steps in
    /// between inherit it.
    Segment { index: usize, has_pending: bool },
}

impl TargetUnit {
    pub fn segment_index(self) -> Option<usize> {
        match self {
            Self::Contiguous => None,
            Self::Segment { index, .. } => Some(index),
        }
    }

    /// Pending state after this step, given the parent's.
    fn pending_after(self, parent_pending: bool) -> bool {
        match self {
            Self::Contiguous => parent_pending,
            Self::Segment { has_pending, .. } => has_pending,
        }
    }

    /// Whether this step carries the rule-level score. Later segments of a
    /// discontinuous rule only add their derivation features.
    fn opens_rule(self) -> bool {
        self.segment_index().map_or(true, |i| i == 0)
    }
}

/// One node of the derivation tree.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    /// Creation id, unique and increasing across every session sharing an
    /// [`IdSource`].
    pub id: u64,
    pub sentence_id: usize,
    pub score: f64,
    /// Estimate of the score still to be gained. Non-finite values mark the
    /// hypothesis as non-viable for good.
    pub h: f64,
    pub coverage: CoverageSet,
    /// Index-aligned with the session's annotators.
    pub annotations: Vec<AnnotatorState>,
    /// `None` only for the root.
    pub rule: Option<Arc<ConcreteRule>>,
    pub parent: Option<HypId>,
    pub insertion_position: usize,
    /// Target length reached.
    pub length: usize,
    pub depth: usize,
    pub linear_distortion: usize,
    pub untranslated_tokens: usize,
    /// Features contributed by this step alone.
    pub local_features: Vec<FeatureValue>,
    /// Target tokens emitted by this step.
    pub target_fragment: Phrase,
    pub unit: TargetUnit,
    /// A discontinuous rule still has target segments to place.
    pub pending_phrases: bool,
}

impl Hypothesis {
    pub fn final_score_estimate(&self) -> f64 {
        self.score + self.h
    }

    /// All source tokens covered and no target segment left to place.
    pub fn is_done(&self) -> bool {
        self.untranslated_tokens == 0 && !self.has_pending_phrases()
    }

    pub fn has_untranslated_tokens(&self) -> bool {
        self.untranslated_tokens > 0
    }

    pub fn has_pending_phrases(&self) -> bool {
        self.pending_phrases
    }

    pub fn is_viable(&self) -> bool {
        self.h.is_finite()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Best first: higher `score + h` ranks lower, ties go to the older id.
impl Ord for Hypothesis {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(
            (self.final_score_estimate(), self.id),
            (other.final_score_estimate(), other.id),
        )
    }
}

impl PartialOrd for Hypothesis {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Hypothesis {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Hypothesis {}

fn rank((a_est, a_id): (f64, u64), (b_est, b_id): (f64, u64)) -> Ordering {
    b_est.total_cmp(&a_est).then(a_id.cmp(&b_id))
}

/// Copyable ordering key for frontier queues.
///
/// Orders exactly like [`Hypothesis`], so a sorted `Vec` starts with the best
/// entry and a `BinaryHeap<Reverse<SearchPriority>>` pops it first.
#[derive(Debug, Clone, Copy)]
pub struct SearchPriority {
    pub estimate: f64,
    pub id: u64,
    pub handle: HypId,
}

impl SearchPriority {
    pub fn of(handle: HypId, hyp: &Hypothesis) -> Self {
        Self {
            estimate: hyp.final_score_estimate(),
            id: hyp.id,
            handle,
        }
    }
}

impl Ord for SearchPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        rank((self.estimate, self.id), (other.estimate, other.id))
    }
}

impl PartialOrd for SearchPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchPriority {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SearchPriority {}

/// Append-only storage for the hypotheses of one sentence.
#[derive(Debug, Default)]
pub struct HypothesisArena {
    nodes: Vec<Hypothesis>,
}

impl HypothesisArena {
    pub fn push(&mut self, hyp: Hypothesis) -> HypId {
        let id = HypId(self.nodes.len());
        self.nodes.push(hyp);
        id
    }

    pub fn get(&self, id: HypId) -> Option<&Hypothesis> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HypId, &Hypothesis)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, h)| (HypId(i), h))
    }

    /// `id` and its ancestors, leaf first.
    pub fn ancestors(&self, id: HypId) -> impl Iterator<Item = &Hypothesis> + '_ {
        std::iter::successors(Some(&self[id]), move |h| h.parent.map(|p| &self[p]))
    }
}

impl Index<HypId> for HypothesisArena {
    type Output = Hypothesis;

    fn index(&self, id: HypId) -> &Hypothesis {
        &self.nodes[id.index()]
    }
}

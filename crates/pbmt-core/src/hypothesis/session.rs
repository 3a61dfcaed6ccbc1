use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use super::{HypId, Hypothesis, HypothesisArena, SearchPriority, TargetUnit};
use crate::annotator::{extend_all, finalize_all, Annotator};
use crate::coverage::CoverageSet;
use crate::featurizer::{CombinedFeaturizer, Featurizable};
use crate::generator::TranslationOptions;
use crate::heuristic::SearchHeuristic;
use crate::phrase::Phrase;
use crate::rule::ConcreteRule;
use crate::scorer::Scorer;

/// Shared counter handing out hypothesis creation ids.
///
/// Clones share the counter, so every session built from clones of one
/// `IdSource` draws from the same sequence, whatever thread it runs on.
#[derive(Debug, Clone, Default)]
pub struct IdSource(Arc<AtomicU64>);

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id. The first id handed out is 1.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Last id handed out, 0 if none.
    pub fn last_id(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Read-only models plus the id counter, shared by all sessions.
#[derive(Clone)]
pub struct DecodeContext {
    pub ids: IdSource,
    pub featurizer: Arc<CombinedFeaturizer>,
    pub scorer: Arc<dyn Scorer>,
    pub annotators: Arc<[Arc<dyn Annotator>]>,
}

impl DecodeContext {
    pub fn new(featurizer: Arc<CombinedFeaturizer>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            ids: IdSource::new(),
            featurizer,
            scorer,
            annotators: Vec::new().into(),
        }
    }

    pub fn with_annotators(mut self, annotators: Vec<Arc<dyn Annotator>>) -> Self {
        self.annotators = annotators.into();
        self
    }

    pub fn with_ids(mut self, ids: IdSource) -> Self {
        self.ids = ids;
        self
    }
}

/// Decoding state of one sentence: its heuristic and every hypothesis built
/// so far, root included.
pub struct DecodeSession {
    ctx: DecodeContext,
    sentence_id: usize,
    source: Phrase,
    heuristic: Box<dyn SearchHeuristic>,
    arena: HypothesisArena,
    root: HypId,
}

impl DecodeSession {
    /// Build the root hypothesis of `source`.
    ///
    /// The heuristic sees all grounded `options` once, here.
    pub fn new(
        ctx: DecodeContext,
        sentence_id: usize,
        source: Phrase,
        mut heuristic: Box<dyn SearchHeuristic>,
        options: &TranslationOptions,
    ) -> Self {
        let _span = debug_span!("session_root", sentence_id, n = source.len()).entered();

        let h = heuristic.initial_heuristic(&source, options, ctx.scorer.as_ref(), sentence_id);
        let root = Hypothesis {
            id: ctx.ids.next_id(),
            sentence_id,
            score: 0.0,
            h,
            coverage: CoverageSet::new(source.len()),
            annotations: ctx.annotators.iter().map(|a| a.initialize(&source)).collect(),
            rule: None,
            parent: None,
            insertion_position: 0,
            length: 0,
            depth: 0,
            linear_distortion: 0,
            untranslated_tokens: source.len(),
            local_features: Vec::new(),
            target_fragment: Phrase::empty(),
            unit: TargetUnit::Contiguous,
            pending_phrases: false,
        };
        debug!(id = root.id, h, options = options.len());

        let mut arena = HypothesisArena::default();
        let root_id = arena.push(root);
        Self {
            ctx,
            sentence_id,
            source,
            heuristic,
            arena,
            root: root_id,
        }
    }

    pub fn root(&self) -> HypId {
        self.root
    }

    pub fn get(&self, id: HypId) -> &Hypothesis {
        &self.arena[id]
    }

    pub fn arena(&self) -> &HypothesisArena {
        &self.arena
    }

    pub fn source(&self) -> &Phrase {
        &self.source
    }

    pub fn sentence_id(&self) -> usize {
        self.sentence_id
    }

    pub fn context(&self) -> &DecodeContext {
        &self.ctx
    }

    pub fn priority(&self, id: HypId) -> SearchPriority {
        SearchPriority::of(id, &self.arena[id])
    }

    /// Apply `rule` to `parent`, emitting its whole target at
    /// `insertion_position`.
    ///
    /// The rule must not overlap the parent's coverage; this is only checked
    /// in debug builds.
    pub fn extend(
        &mut self,
        parent: HypId,
        rule: &Arc<ConcreteRule>,
        insertion_position: usize,
    ) -> HypId {
        let fragment = rule.rule.target.clone();
        self.build(parent, rule, insertion_position, fragment, TargetUnit::Contiguous)
    }

    /// Apply one segment of a discontinuous rule.
    ///
    /// Segment 0 covers the rule's source span; later segments fill a gap
    /// left by an earlier one and cover nothing new.
    pub fn extend_segment(
        &mut self,
        parent: HypId,
        rule: &Arc<ConcreteRule>,
        insertion_position: usize,
        segment: Phrase,
        segment_index: usize,
        has_pending: bool,
    ) -> HypId {
        let unit = TargetUnit::Segment {
            index: segment_index,
            has_pending,
        };
        self.build(parent, rule, insertion_position, segment, unit)
    }

    fn build(
        &mut self,
        parent_id: HypId,
        rule: &Arc<ConcreteRule>,
        insertion_position: usize,
        fragment: Phrase,
        unit: TargetUnit,
    ) -> HypId {
        let parent = &self.arena[parent_id];
        debug_assert!(
            !unit.opens_rule() || !parent.coverage.intersects(&rule.coverage),
            "rule at {} overlaps coverage {}",
            rule.source_position,
            parent.coverage
        );

        let mut coverage = parent.coverage.clone();
        coverage.union_with(&rule.coverage);
        let newly_covered = coverage.difference(&parent.coverage);

        let length = if insertion_position < parent.length {
            parent.length
        } else {
            insertion_position + fragment.len()
        };
        let linear_distortion = match &parent.rule {
            Some(prev) => prev.linear_distortion(rule),
            None => rule.source_position,
        };
        let untranslated_tokens = self.source.len() - coverage.cardinality();
        let pending_phrases = unit.pending_after(parent.pending_phrases);

        let mut annotations = extend_all(&self.ctx.annotators, &parent.annotations, rule, &fragment);
        let done = untranslated_tokens == 0 && !pending_phrases;
        if done {
            finalize_all(&self.ctx.annotators, &mut annotations);
        }

        let mut local_features = self.ctx.featurizer.list_featurize(&Featurizable {
            sentence_id: self.sentence_id,
            rule: &rule.rule,
            source_phrase: &rule.rule.source,
            target_phrase: &fragment,
            source_position: rule.source_position,
            insertion_position,
            linear_distortion,
            untranslated_tokens,
            has_pending_phrases: pending_phrases,
            segment_index: unit.segment_index(),
        });
        if unit.opens_rule() {
            local_features.extend(rule.cached_features.iter().cloned());
        }
        let score = parent.score + self.ctx.scorer.incremental_score(&local_features);

        let mut child = Hypothesis {
            id: self.ctx.ids.next_id(),
            sentence_id: self.sentence_id,
            score,
            h: parent.h,
            coverage,
            annotations,
            rule: Some(Arc::clone(rule)),
            parent: Some(parent_id),
            insertion_position,
            length,
            depth: parent.depth + 1,
            linear_distortion,
            untranslated_tokens,
            local_features,
            target_fragment: fragment,
            unit,
            pending_phrases,
        };
        if parent.h.is_infinite() {
            trace!(id = child.id, parent = parent.id, "non-viable parent");
        } else {
            child.h = parent.h + self.heuristic.heuristic_delta(&child, &newly_covered);
        }
        assert!(!child.h.is_nan(), "heuristic produced NaN for hypothesis {}", child.id);

        self.arena.push(child)
    }
}

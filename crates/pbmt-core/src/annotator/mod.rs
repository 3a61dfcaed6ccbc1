//! Per-hypothesis annotation state.
//!
//! Every hypothesis carries one [`AnnotatorState`] per annotator of its
//! session, in the session's annotator order. States are values: extending a
//! parent state for a child builds a new state and leaves the parent's as it
//! was, so siblings never observe each other.

mod dependency;
mod tags;

pub use dependency::{DependencyState, Head, TargetDependencyAnnotator};
pub use tags::{TagState, TargetTagAnnotator, CARDINAL_TAG, UNKNOWN_TAG};

use std::sync::Arc;

use crate::phrase::Phrase;
use crate::rule::ConcreteRule;

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatorState {
    Dependency(Arc<DependencyState>),
    Tags(Arc<TagState>),
}

impl AnnotatorState {
    pub fn as_dependency(&self) -> Option<&DependencyState> {
        match self {
            Self::Dependency(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&TagState> {
        match self {
            Self::Tags(state) => Some(state),
            _ => None,
        }
    }
}

pub trait Annotator: Send + Sync {
    fn name(&self) -> &str;

    fn initialize(&self, source: &Phrase) -> AnnotatorState;

    /// State after applying `rule`, which emitted `fragment` on the target
    /// side. `state` must be left untouched.
    fn extend(&self, state: &AnnotatorState, rule: &ConcreteRule, fragment: &Phrase)
        -> AnnotatorState;

    /// Present when the annotator has work to do once a derivation completes.
    fn finalizer(&self) -> Option<&dyn Finalize> {
        None
    }
}

/// Completion step, run once on the state of the hypothesis whose coverage
/// just became complete.
pub trait Finalize {
    fn finalize(&self, state: &AnnotatorState) -> AnnotatorState;
}

/// Extend each state with its annotator, in lock-step.
pub(crate) fn extend_all(
    annotators: &[Arc<dyn Annotator>],
    states: &[AnnotatorState],
    rule: &ConcreteRule,
    fragment: &Phrase,
) -> Vec<AnnotatorState> {
    debug_assert_eq!(annotators.len(), states.len());
    annotators
        .iter()
        .zip(states)
        .map(|(annotator, state)| annotator.extend(state, rule, fragment))
        .collect()
}

/// Run every available finalizer over `states` in place.
pub(crate) fn finalize_all(annotators: &[Arc<dyn Annotator>], states: &mut [AnnotatorState]) {
    for (annotator, state) in annotators.iter().zip(states.iter_mut()) {
        if let Some(finalizer) = annotator.finalizer() {
            *state = finalizer.finalize(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::featurizer::CombinedFeaturizer;
    use crate::rule::{PhraseAlignment, Rule};
    use crate::scorer::LinearScorer;

    fn grounded(src: &str, tgt: &str, pos: usize, len: usize) -> ConcreteRule {
        let rule = Rule::new(
            Phrase::from_text(src),
            Phrase::from_text(tgt),
            vec![],
            Vec::new().into(),
            PhraseAlignment::Identity,
        );
        ConcreteRule::new(
            Arc::new(rule),
            pos,
            len,
            0,
            &CombinedFeaturizer::default(),
            &LinearScorer::default(),
        )
    }

    #[test]
    fn sibling_extensions_leave_parent_untouched() {
        let annotators: Vec<Arc<dyn Annotator>> = vec![
            Arc::new(TargetDependencyAnnotator::new()),
            Arc::new(TargetTagAnnotator::from_pairs([("house", "NN"), ("the", "DT")])),
        ];
        let source = Phrase::from_text("das haus");
        let parent: Vec<AnnotatorState> =
            annotators.iter().map(|a| a.initialize(&source)).collect();
        let snapshot = parent.clone();

        let r1 = grounded("das haus", "the house", 0, 2);
        let r2 = grounded("das", "that", 0, 2);
        let a = extend_all(&annotators, &parent, &r1, &r1.rule.target);
        let b = extend_all(&annotators, &parent, &r2, &r2.rule.target);

        assert_eq!(parent, snapshot);
        assert_ne!(a, b);
        assert_eq!(a[1].as_tags().unwrap().tag_strings(), vec!["DT", "NN"]);
        assert_eq!(b[1].as_tags().unwrap().tag_strings(), vec!["UNK"]);
        assert_eq!(parent[0].as_dependency().unwrap().len(), 0);
    }

    #[test]
    fn finalize_all_only_touches_finalizable_annotators() {
        let annotators: Vec<Arc<dyn Annotator>> = vec![
            Arc::new(TargetDependencyAnnotator::new()),
            Arc::new(TargetTagAnnotator::default()),
        ];
        let source = Phrase::from_text("a");
        let init: Vec<AnnotatorState> = annotators.iter().map(|a| a.initialize(&source)).collect();
        let rule = grounded("a", "x", 0, 1);
        let mut states = extend_all(&annotators, &init, &rule, &rule.rule.target);
        let tags_before = states[1].clone();

        finalize_all(&annotators, &mut states);

        assert!(states[0].as_dependency().unwrap().is_finalized());
        assert_eq!(states[1], tags_before);
        assert!(!init[0].as_dependency().unwrap().is_finalized());
    }
}

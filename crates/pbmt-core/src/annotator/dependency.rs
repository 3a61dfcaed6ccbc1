use std::sync::Arc;

use super::{Annotator, AnnotatorState, Finalize};
use crate::phrase::{Phrase, Token};
use crate::rule::ConcreteRule;

/// Attachment of one target token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    Root,
    /// Index of another token, in emission order.
    Token(usize),
}

/// Partial target-side dependency structure, in token emission order.
///
/// A `None` head is still open. Each emitted fragment leaves exactly one open
/// token, its last one, which the other tokens of the fragment attach to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyState {
    tokens: Vec<Token>,
    heads: Vec<Option<Head>>,
    finalized: bool,
}

impl DependencyState {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn head(&self, index: usize) -> Option<Head> {
        self.heads.get(index).copied().flatten()
    }

    pub fn open_heads(&self) -> impl Iterator<Item = usize> + '_ {
        self.heads
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.is_none().then_some(i))
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn with_fragment(&self, fragment: &Phrase) -> Self {
        let mut next = self.clone();
        let Some(last) = fragment.len().checked_sub(1) else {
            return next;
        };
        let head = next.tokens.len() + last;
        for (i, token) in fragment.iter().enumerate() {
            next.tokens.push(token.clone());
            next.heads.push((i != last).then_some(Head::Token(head)));
        }
        next
    }

    fn finalized(&self) -> Self {
        let mut next = self.clone();
        let open: Vec<usize> = next.open_heads().collect();
        if let Some((&root, rest)) = open.split_last() {
            for &i in rest {
                next.heads[i] = Some(Head::Token(root));
            }
            next.heads[root] = Some(Head::Root);
        }
        next.finalized = true;
        next
    }
}

/// Builds a right-headed dependency skeleton over the emitted target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetDependencyAnnotator;

impl TargetDependencyAnnotator {
    pub fn new() -> Self {
        Self
    }
}

impl Annotator for TargetDependencyAnnotator {
    fn name(&self) -> &str {
        "TargetDependency"
    }

    fn initialize(&self, _source: &Phrase) -> AnnotatorState {
        AnnotatorState::Dependency(Arc::default())
    }

    fn extend(
        &self,
        state: &AnnotatorState,
        _rule: &ConcreteRule,
        fragment: &Phrase,
    ) -> AnnotatorState {
        let Some(deps) = state.as_dependency() else {
            unreachable!("{} received a foreign state", self.name());
        };
        AnnotatorState::Dependency(Arc::new(deps.with_fragment(fragment)))
    }

    fn finalizer(&self) -> Option<&dyn Finalize> {
        Some(self)
    }
}

impl Finalize for TargetDependencyAnnotator {
    fn finalize(&self, state: &AnnotatorState) -> AnnotatorState {
        let Some(deps) = state.as_dependency() else {
            unreachable!("{} received a foreign state", self.name());
        };
        AnnotatorState::Dependency(Arc::new(deps.finalized()))
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use super::{Annotator, AnnotatorState};
use crate::generator::is_numeric_like;
use crate::phrase::{Phrase, Token};
use crate::rule::ConcreteRule;

pub const UNKNOWN_TAG: &str = "UNK";
pub const CARDINAL_TAG: &str = "CD";

/// Part-of-speech tags of the emitted target tokens, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagState {
    tagged: Vec<(Token, Arc<str>)>,
}

impl TagState {
    pub fn len(&self) -> usize {
        self.tagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tagged.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tagged.iter().map(|(t, tag)| (&**t, &**tag))
    }

    pub fn tag_strings(&self) -> Vec<&str> {
        self.tagged.iter().map(|(_, tag)| &**tag).collect()
    }
}

/// Tags target tokens from a fixed word → tag lexicon.
///
/// Words missing from the lexicon are tagged `CD` if numeric-like and `UNK`
/// otherwise. Tags are fixed when a hypothesis is built and never revisited.
#[derive(Debug, Clone, Default)]
pub struct TargetTagAnnotator {
    lexicon: HashMap<String, Arc<str>>,
}

impl TargetTagAnnotator {
    pub fn new(lexicon: HashMap<String, Arc<str>>) -> Self {
        Self { lexicon }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(word, tag)| (word.to_string(), Arc::from(tag)))
                .collect(),
        )
    }

    fn tag(&self, word: &str) -> Arc<str> {
        if let Some(tag) = self.lexicon.get(word) {
            return tag.clone();
        }
        if is_numeric_like(word) {
            CARDINAL_TAG.into()
        } else {
            UNKNOWN_TAG.into()
        }
    }
}

impl Annotator for TargetTagAnnotator {
    fn name(&self) -> &str {
        "TargetTags"
    }

    fn initialize(&self, _source: &Phrase) -> AnnotatorState {
        AnnotatorState::Tags(Arc::default())
    }

    fn extend(
        &self,
        state: &AnnotatorState,
        _rule: &ConcreteRule,
        fragment: &Phrase,
    ) -> AnnotatorState {
        let Some(tags) = state.as_tags() else {
            unreachable!("{} received a foreign state", self.name());
        };
        let mut next = tags.clone();
        next.tagged.extend(fragment.iter().map(|t| (t.clone(), self.tag(t))));
        AnnotatorState::Tags(Arc::new(next))
    }
}

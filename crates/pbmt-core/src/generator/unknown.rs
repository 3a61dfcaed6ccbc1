use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::{RuleGenerator, SequenceFilter};
use crate::phrase::Phrase;
use crate::rule::{PhraseAlignment, Rule};
use crate::settings::UnknownWordSettings;

pub const GENERATOR_NAME: &str = "IdentityPhraseGenerator(Dyn)";
pub const DEFAULT_SCORE_NAME: &str = "p_i(t|f)";
pub const DEFAULT_SCORE: f32 = 1.0;

/// Fallback rules for source tokens no table covers.
///
/// Emits exactly one rule per accepted token: an identity copy, or, when
/// dropping is enabled and the token is neither numeric-like nor ASCII, a
/// deletion with an empty target.
pub struct UnknownWordGenerator {
    drop_unknown_words: bool,
    score_names: Arc<[String]>,
    score: f32,
    filter: Option<Box<dyn SequenceFilter>>,
}

impl UnknownWordGenerator {
    pub fn new(drop_unknown_words: bool) -> Self {
        Self {
            drop_unknown_words,
            score_names: vec![DEFAULT_SCORE_NAME.to_string()].into(),
            score: DEFAULT_SCORE,
            filter: None,
        }
    }

    pub fn from_settings(settings: &UnknownWordSettings) -> Self {
        Self::new(settings.drop).with_score(&settings.score_name, settings.score)
    }

    pub fn with_score(mut self, name: &str, score: f32) -> Self {
        self.score_names = vec![name.to_string()].into();
        self.score = score;
        self
    }

    /// Tokens the filter rejects get no rule at all.
    pub fn with_filter(mut self, filter: impl SequenceFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn drops_unknown_words(&self) -> bool {
        self.drop_unknown_words
    }

    fn rule(&self, source: Phrase, target: Phrase) -> Arc<Rule> {
        Arc::new(Rule::new(
            source,
            target,
            vec![self.score],
            self.score_names.clone(),
            PhraseAlignment::Identity,
        ))
    }
}

impl RuleGenerator for UnknownWordGenerator {
    fn name(&self) -> &str {
        GENERATOR_NAME
    }

    fn translation_options(&self, sequence: &Phrase) -> Vec<Arc<Rule>> {
        if let Some(filter) = &self.filter {
            if !filter.accepts(sequence) {
                return Vec::new();
            }
        }
        let word = sequence.to_string();
        let target = if self.drop_unknown_words && !is_numeric_like(&word) && !is_ascii_word(&word) {
            Phrase::empty()
        } else {
            sequence.clone()
        };
        vec![self.rule(sequence.clone(), target)]
    }

    fn longest_source_phrase(&self) -> i32 {
        -i32::MAX
    }
}

/// Digits or separators (`. \ / , : -`), optionally followed by letters or `%`,
/// at the end of the word.
pub fn is_numeric_like(word: &str) -> bool {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC
        .get_or_init(|| {
            Regex::new(r"^.*[0-9.\\/,:\-]+[%A-Za-z]*$").expect("numeric pattern must compile")
        })
        .is_match(word)
}

/// The decoder's working alphabet: plain ASCII.
pub fn is_ascii_word(word: &str) -> bool {
    word.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(generator: &UnknownWordGenerator, word: &str) -> Vec<Arc<Rule>> {
        generator.translation_options(&Phrase::from_text(word))
    }

    #[test]
    fn numeric_like_words() {
        for w in ["42", "3.14", "1,000", "12:30", "2024-01-01", "50%", "10km", "a/b-"] {
            assert!(is_numeric_like(w), "{w} should be numeric-like");
        }
        for w in ["haus", "%", "", "東京"] {
            assert!(!is_numeric_like(w), "{w} should not be numeric-like");
        }
    }

    #[test]
    fn identity_when_dropping_disabled() {
        let g = UnknownWordGenerator::new(false);
        let rules = single(&g, "42");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target.to_string(), "42");
        assert_eq!(rules[0].source.to_string(), "42");
        assert_eq!(rules[0].alignment, PhraseAlignment::Identity);
        assert_eq!(rules[0].named_scores().collect::<Vec<_>>(), vec![("p_i(t|f)", 1.0)]);

        let rules = single(&g, "東京");
        assert_eq!(rules[0].target.to_string(), "東京");
    }

    #[test]
    fn non_ascii_non_numeric_word_is_deleted_when_dropping() {
        let g = UnknownWordGenerator::new(true);
        let rules = single(&g, "東京");
        assert_eq!(rules.len(), 1);
        assert!(rules[0].target.is_empty());
        assert_eq!(rules[0].source.to_string(), "東京");
    }

    #[test]
    fn ascii_and_numeric_words_survive_dropping() {
        let g = UnknownWordGenerator::new(true);
        assert_eq!(single(&g, "Obama")[0].target.to_string(), "Obama");
        assert_eq!(single(&g, "٣٤5")[0].target.to_string(), "٣٤5");
    }

    #[test]
    fn filter_rejects_token() {
        let g = UnknownWordGenerator::new(false).with_filter(|p: &Phrase| &*p[0] != "<unk>");
        assert!(single(&g, "<unk>").is_empty());
        assert_eq!(single(&g, "x").len(), 1);
    }

    #[test]
    fn custom_score_name() {
        let g = UnknownWordGenerator::from_settings(&UnknownWordSettings {
            drop: false,
            score_name: "unk".to_string(),
            score: 0.5,
        });
        let rules = single(&g, "x");
        assert_eq!(rules[0].named_scores().collect::<Vec<_>>(), vec![("unk", 0.5)]);
    }

    #[test]
    fn fallback_reports_sentinel_length() {
        let g = UnknownWordGenerator::new(false);
        assert_eq!(g.longest_source_phrase(), -i32::MAX);
        assert_eq!(g.name(), GENERATOR_NAME);
    }
}

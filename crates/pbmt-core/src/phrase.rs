//! Immutable token sequences shared between sentences, rules and hypotheses.

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

/// A single token. Tokens are interned per phrase via `Arc<str>` so that
/// slicing a sentence into rule sources never copies string data.
pub type Token = Arc<str>;

/// An immutable, cheaply clonable sequence of tokens.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Phrase(Arc<[Token]>);

impl Phrase {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new().into())
    }

    /// Split on ASCII whitespace.
    pub fn from_text(text: &str) -> Self {
        text.split_whitespace().map(Token::from).collect()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Copy out a sub-range as a new phrase.
    pub fn slice(&self, range: Range<usize>) -> Phrase {
        Self(self.0[range].into())
    }
}

impl Default for Phrase {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for Phrase {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.0
    }
}

impl FromIterator<Token> for Phrase {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Phrase {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Token::from).collect()
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tok) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(tok)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phrase({:?})", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_splits_on_whitespace() {
        let p = Phrase::from_text("  das  ist\tgut ");
        assert_eq!(p.len(), 3);
        assert_eq!(p.to_string(), "das ist gut");
    }

    #[test]
    fn slice_copies_sub_range() {
        let p = Phrase::from_text("a b c d");
        let s = p.slice(1..3);
        assert_eq!(s.to_string(), "b c");
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn empty_phrase_displays_as_nothing() {
        assert_eq!(Phrase::empty().to_string(), "");
        assert!(Phrase::empty().is_empty());
    }
}

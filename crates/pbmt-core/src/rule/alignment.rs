use std::fmt;
use std::sync::Arc;

/// Word alignment inside a single phrase pair.
///
/// Indices are phrase-relative: `(source_index, target_index)`.
#[derive(Clone, PartialEq, Eq)]
pub enum PhraseAlignment {
    /// Source token `i` aligns to target token `i` (written `I-I`).
    Identity,
    Pairs(Arc<[(u16, u16)]>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("bad alignment token: {0:?}")]
    Malformed(String),

    #[error("source index {index} out of bounds (source length {len})")]
    SourceOutOfBounds { index: usize, len: usize },

    #[error("target index {index} out of bounds (target length {len})")]
    TargetOutOfBounds { index: usize, len: usize },
}

impl PhraseAlignment {
    /// Parse a `s-t s-t ...` alignment string for a phrase pair with the given
    /// lengths. Every pair is bounds-checked; one bad pair rejects the whole
    /// alignment.
    pub fn parse(text: &str, source_len: usize, target_len: usize) -> Result<Self, AlignmentError> {
        let text = text.trim();
        if text == "I-I" {
            return Ok(Self::Identity);
        }
        let mut pairs = Vec::new();
        for token in text.split_whitespace() {
            let (s, t) = token
                .split_once('-')
                .ok_or_else(|| AlignmentError::Malformed(token.to_string()))?;
            let s: usize = s
                .parse()
                .map_err(|_| AlignmentError::Malformed(token.to_string()))?;
            let t: usize = t
                .parse()
                .map_err(|_| AlignmentError::Malformed(token.to_string()))?;
            if s >= source_len {
                return Err(AlignmentError::SourceOutOfBounds {
                    index: s,
                    len: source_len,
                });
            }
            if t >= target_len {
                return Err(AlignmentError::TargetOutOfBounds {
                    index: t,
                    len: target_len,
                });
            }
            let s = u16::try_from(s).map_err(|_| AlignmentError::Malformed(token.to_string()))?;
            let t = u16::try_from(t).map_err(|_| AlignmentError::Malformed(token.to_string()))?;
            pairs.push((s, t));
        }
        Ok(Self::Pairs(pairs.into()))
    }

    /// Target indices aligned to source index `s`.
    pub fn targets_of(&self, s: usize, target_len: usize) -> Vec<usize> {
        match self {
            Self::Identity => {
                if s < target_len {
                    vec![s]
                } else {
                    Vec::new()
                }
            }
            Self::Pairs(pairs) => pairs
                .iter()
                .filter(|(ps, _)| *ps as usize == s)
                .map(|&(_, t)| t as usize)
                .collect(),
        }
    }
}

impl fmt::Display for PhraseAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("I-I"),
            Self::Pairs(pairs) => {
                for (i, (s, t)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{s}-{t}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for PhraseAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhraseAlignment({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_identity() {
        assert_eq!(PhraseAlignment::parse("I-I", 1, 1), Ok(PhraseAlignment::Identity));
    }

    #[test]
    fn parse_pairs() {
        let a = PhraseAlignment::parse("0-1 1-0 1-1", 2, 2).unwrap();
        assert_eq!(a.to_string(), "0-1 1-0 1-1");
        assert_eq!(a.targets_of(1, 2), vec![0, 1]);
        assert!(a.targets_of(5, 2).is_empty());
    }

    #[test]
    fn empty_alignment_is_allowed() {
        let a = PhraseAlignment::parse("", 1, 0).unwrap();
        assert_eq!(a.to_string(), "");
    }

    #[test]
    fn source_index_out_of_bounds_is_fatal() {
        let err = PhraseAlignment::parse("0-0 2-0", 2, 1).unwrap_err();
        assert_eq!(err, AlignmentError::SourceOutOfBounds { index: 2, len: 2 });
    }

    #[test]
    fn target_index_out_of_bounds_is_fatal() {
        let err = PhraseAlignment::parse("0-3", 1, 3).unwrap_err();
        assert!(matches!(err, AlignmentError::TargetOutOfBounds { index: 3, .. }));
        assert!(err.to_string().contains("target length 3"));
    }

    #[test]
    fn malformed_token_is_fatal() {
        assert!(matches!(
            PhraseAlignment::parse("0-0 1:1", 2, 2),
            Err(AlignmentError::Malformed(_))
        ));
        assert!(matches!(
            PhraseAlignment::parse("a-0", 2, 2),
            Err(AlignmentError::Malformed(_))
        ));
    }
}

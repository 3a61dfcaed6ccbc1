use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::RuleGenerator;
use crate::phrase::Phrase;
use crate::rule::{AlignmentError, PhraseAlignment, Rule};

const FIELD_SEPARATOR: &str = "|||";

/// Read-only in-memory rule table keyed by source phrase.
///
/// Text format, one rule per line:
/// `source ||| target ||| score score ... [||| s-t s-t ...]`
/// Blank lines and lines starting with `#` are skipped. A missing alignment
/// field means no alignment links.
#[derive(Debug, Default)]
pub struct MemoryRuleTable {
    name: String,
    rules: HashMap<Phrase, Vec<Arc<Rule>>>,
    longest_source: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected 3 or 4 '|||'-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: empty source phrase")]
    EmptySource { line: usize },

    #[error("line {line}: expected {expected} scores, found {found}")]
    ScoreCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: bad score {value:?}")]
    Score { line: usize, value: String },

    #[error("line {line}: {source}")]
    Alignment {
        line: usize,
        #[source]
        source: AlignmentError,
    },
}

impl MemoryRuleTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, rule: Rule) {
        self.longest_source = self.longest_source.max(rule.source.len());
        self.rules
            .entry(rule.source.clone())
            .or_default()
            .push(Arc::new(rule));
    }

    pub fn open(path: &Path, score_names: &[String]) -> Result<Self, RuleTableError> {
        let content = fs::read_to_string(path)?;
        let mut table = Self::from_text(&content, score_names)?;
        table.name = path.display().to_string();
        Ok(table)
    }

    /// Parse a whole table. Any malformed line rejects the table.
    pub fn from_text(content: &str, score_names: &[String]) -> Result<Self, RuleTableError> {
        let names: Arc<[String]> = score_names.into();
        let mut table = Self::new("memory");
        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            table.insert(parse_line(raw, line, &names)?);
        }
        debug!(
            rules = table.rule_count(),
            sources = table.rules.len(),
            longest = table.longest_source
        );
        Ok(table)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}

fn parse_line(raw: &str, line: usize, names: &Arc<[String]>) -> Result<Rule, RuleTableError> {
    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).map(str::trim).collect();
    if !(3..=4).contains(&fields.len()) {
        return Err(RuleTableError::FieldCount {
            line,
            found: fields.len(),
        });
    }
    let source = Phrase::from_text(fields[0]);
    if source.is_empty() {
        return Err(RuleTableError::EmptySource { line });
    }
    let target = Phrase::from_text(fields[1]);

    let scores = fields[2]
        .split_whitespace()
        .map(|v| {
            v.parse::<f32>().map_err(|_| RuleTableError::Score {
                line,
                value: v.to_string(),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;
    if scores.len() != names.len() {
        return Err(RuleTableError::ScoreCount {
            line,
            expected: names.len(),
            found: scores.len(),
        });
    }

    let alignment = match fields.get(3) {
        Some(text) => PhraseAlignment::parse(text, source.len(), target.len())
            .map_err(|source| RuleTableError::Alignment { line, source })?,
        None => PhraseAlignment::Pairs(Vec::new().into()),
    };
    Ok(Rule::new(source, target, scores, names.clone(), alignment))
}

impl RuleGenerator for MemoryRuleTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn translation_options(&self, sequence: &Phrase) -> Vec<Arc<Rule>> {
        self.rules.get(sequence).cloned().unwrap_or_default()
    }

    fn longest_source_phrase(&self) -> i32 {
        i32::try_from(self.longest_source).unwrap_or(i32::MAX)
    }
}

use std::fmt::Write as _;

use serde::Serialize;

use super::{DecodeSession, HypId, Hypothesis};
use crate::phrase::{Phrase, Token};

/// One applied rule of a derivation, as rendered for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivationStep {
    pub hypothesis_id: u64,
    pub source: String,
    /// Target tokens emitted by the step.
    pub target: String,
    pub rule_coverage: Vec<usize>,
    /// Coverage after the step.
    pub coverage: Vec<usize>,
    pub scores: Vec<f32>,
    pub insertion_position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<usize>,
    pub score: f64,
}

impl DerivationStep {
    fn of(hyp: &Hypothesis) -> Option<Self> {
        let rule = hyp.rule.as_ref()?;
        Some(Self {
            hypothesis_id: hyp.id,
            source: rule.rule.source.to_string(),
            target: hyp.target_fragment.to_string(),
            rule_coverage: rule.coverage.iter().collect(),
            coverage: hyp.coverage.iter().collect(),
            scores: rule.rule.scores.to_vec(),
            insertion_position: hyp.insertion_position,
            segment_index: hyp.unit.segment_index(),
            score: hyp.score,
        })
    }
}

impl DecodeSession {
    /// Steps from the first applied rule down to `id`. Empty for the root.
    pub fn derivation(&self, id: HypId) -> Vec<DerivationStep> {
        let mut steps: Vec<DerivationStep> = self
            .arena()
            .ancestors(id)
            .filter_map(DerivationStep::of)
            .collect();
        steps.reverse();
        steps
    }

    /// Target produced so far, each fragment spliced in at its insertion
    /// position (clamped to the current end).
    pub fn translation(&self, id: HypId) -> Phrase {
        let chain: Vec<&Hypothesis> = self.arena().ancestors(id).collect();
        let mut tokens: Vec<Token> = Vec::new();
        for hyp in chain.into_iter().rev() {
            let at = hyp.insertion_position.min(tokens.len());
            tokens.splice(at..at, hyp.target_fragment.iter().cloned());
        }
        Phrase::new(tokens)
    }

    /// `<translation>  {coverage} [estimate h: h]`, followed by one line per
    /// applied rule when `verbose`.
    pub fn describe(&self, id: HypId, verbose: bool) -> String {
        let hyp = self.get(id);
        let mut out = String::new();
        if hyp.is_root() {
            out.push_str("<NONE>");
        } else {
            out.push_str(&self.translation(id).to_string());
        }
        let _ = write!(
            out,
            "  {} [{:.3} h: {:.3}]",
            hyp.coverage,
            hyp.final_score_estimate(),
            hyp.h
        );
        if verbose {
            out.push_str("\nSegmentation:\n");
            for hyp in self.arena().ancestors(id).collect::<Vec<_>>().into_iter().rev() {
                let Some(rule) = &hyp.rule else { continue };
                let _ = writeln!(
                    out,
                    "\t{} {} {:?}",
                    hyp.target_fragment, rule.coverage, rule.rule.scores
                );
            }
        }
        out
    }
}

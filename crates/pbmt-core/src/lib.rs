//! Core of a phrase-based translation decoder: grounded rules, feature
//! scoring, search heuristics and the hypotheses a search controller expands.

pub mod annotator;
pub mod coverage;
pub mod featurizer;
pub mod generator;
pub mod heuristic;
pub mod hypothesis;
pub mod phrase;
pub mod rule;
pub mod scorer;
pub mod settings;

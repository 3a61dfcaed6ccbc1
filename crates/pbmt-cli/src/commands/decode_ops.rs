use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use pbmt_core::annotator::{Annotator, TargetDependencyAnnotator, TargetTagAnnotator};
use pbmt_core::featurizer::{CombinedFeaturizer, DomainTableError, FeatureValue};
use pbmt_core::generator::{
    ground_sentence, MemoryRuleTable, RuleTableError, TranslationOptions, UnknownWordGenerator,
};
use pbmt_core::heuristic::IsolatedPhraseHeuristic;
use pbmt_core::hypothesis::{DecodeContext, DecodeSession, DerivationStep, HypId};
use pbmt_core::phrase::Phrase;
use pbmt_core::scorer::LinearScorer;
use pbmt_core::settings::{self, Settings, SettingsError};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("rule table: {0}")]
    Table(#[from] RuleTableError),
    #[error("domain table: {0}")]
    Domain(#[from] DomainTableError),
}

/// Everything needed to decode sentences against one rule table.
pub struct Models {
    pub settings: Settings,
    pub table: MemoryRuleTable,
    pub unknown: UnknownWordGenerator,
    pub ctx: DecodeContext,
}

/// Settings from `config`, or the embedded defaults.
pub fn load_settings(config: Option<&str>) -> Result<Settings, DecodeError> {
    match config {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| DecodeError::Io {
                path: path.to_string(),
                source,
            })?;
            Ok(settings::parse_settings_toml(&content)?)
        }
        None => Ok(settings::settings().clone()),
    }
}

impl Models {
    pub fn load(table_file: &str, config: Option<&str>, drop_unknown: bool) -> Result<Self, DecodeError> {
        let mut settings = load_settings(config)?;
        settings.unknown_words.drop |= drop_unknown;
        let table = MemoryRuleTable::open(Path::new(table_file), &settings.table.score_names)?;
        Self::from_parts(settings, table)
    }

    pub fn from_parts(settings: Settings, table: MemoryRuleTable) -> Result<Self, DecodeError> {
        let featurizer = CombinedFeaturizer::from_settings(&settings.features)?;
        let annotators: Vec<Arc<dyn Annotator>> = vec![
            Arc::new(TargetDependencyAnnotator::new()),
            Arc::new(TargetTagAnnotator::default()),
        ];
        let ctx = DecodeContext::new(
            Arc::new(featurizer),
            Arc::new(LinearScorer::from_settings(&settings)),
        )
        .with_annotators(annotators);
        Ok(Self {
            unknown: UnknownWordGenerator::from_settings(&settings.unknown_words),
            settings,
            table,
            ctx,
        })
    }

    pub fn ground(&self, source: &Phrase, sentence_id: usize) -> TranslationOptions {
        ground_sentence(
            source,
            sentence_id,
            &[&self.table, &self.unknown],
            &self.ctx.featurizer,
            self.ctx.scorer.as_ref(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct RuleListing {
    pub start: usize,
    pub end: usize,
    pub source: String,
    pub target: String,
    pub isolation_score: f64,
    pub features: Vec<FeatureValue>,
}

pub fn list_rules(models: &Models, sentence: &str) -> Vec<RuleListing> {
    let source = Phrase::from_text(sentence);
    let options = models.ground(&source, 0);
    options
        .iter()
        .map(|r| RuleListing {
            start: r.source_position,
            end: r.source_end(),
            source: r.rule.source.to_string(),
            target: r.rule.target.to_string(),
            isolation_score: r.isolation_score,
            features: r.cached_features.clone(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct TraceReport {
    pub sentence: String,
    pub translation: String,
    pub complete: bool,
    pub score: f64,
    pub h: f64,
    pub hypotheses: usize,
    pub steps: Vec<DerivationStep>,
    pub tags: Vec<(String, String)>,
    #[serde(skip)]
    pub description: String,
}

/// Greedy walk: expand every non-overlapping option of the current
/// hypothesis, appending at the end of the target, and keep the best child.
/// Stops at a complete hypothesis or when nothing applies.
pub fn trace_sentence(models: &Models, sentence: &str, verbose: bool) -> TraceReport {
    let source = Phrase::from_text(sentence);
    let options = models.ground(&source, 0);
    let mut session = DecodeSession::new(
        models.ctx.clone(),
        0,
        source,
        Box::new(IsolatedPhraseHeuristic::new()),
        &options,
    );

    let mut current = session.root();
    while !session.get(current).is_done() {
        match best_child(&mut session, &options, current) {
            Some(next) => current = next,
            None => break,
        }
    }

    let hyp = session.get(current);
    debug!(
        complete = hyp.is_done(),
        depth = hyp.depth,
        hypotheses = session.arena().len(),
        "trace finished"
    );
    let tags = hyp
        .annotations
        .iter()
        .find_map(|a| a.as_tags())
        .map(|t| t.iter().map(|(w, tag)| (w.to_string(), tag.to_string())).collect())
        .unwrap_or_default();
    TraceReport {
        sentence: sentence.to_string(),
        translation: session.translation(current).to_string(),
        complete: hyp.is_done(),
        score: hyp.score,
        h: hyp.h,
        hypotheses: session.arena().len(),
        steps: session.derivation(current),
        tags,
        description: session.describe(current, verbose),
    }
}

fn best_child(session: &mut DecodeSession, options: &TranslationOptions, parent: HypId) -> Option<HypId> {
    let coverage = session.get(parent).coverage.clone();
    let length = session.get(parent).length;
    let mut best = None;
    for pos in coverage.gaps().into_iter().flatten() {
        for rule in options.starting_at(pos) {
            if coverage.intersects(&rule.coverage) {
                continue;
            }
            let child = session.extend(parent, rule, length);
            let priority = session.priority(child);
            if best.map_or(true, |b| priority < b) {
                best = Some(priority);
            }
        }
    }
    best.map(|b| b.handle)
}

pub fn rules_cmd(table_file: &str, sentence: &[String], config: Option<&str>) {
    let models = die!(Models::load(table_file, config, false), "Error: {}");
    let sentence = sentence.join(" ");
    for r in list_rules(&models, &sentence) {
        println!(
            "{}-{}\t{} ||| {}\t{:.3}",
            r.start, r.end, r.source, r.target, r.isolation_score
        );
    }
}

pub fn trace_cmd(
    table_file: &str,
    sentence: &[String],
    json: bool,
    verbose: bool,
    drop_unknown: bool,
    config: Option<&str>,
) {
    let models = die!(Models::load(table_file, config, drop_unknown), "Error: {}");
    let report = trace_sentence(&models, &sentence.join(" "), verbose);
    if json {
        let out = die!(serde_json::to_string_pretty(&report), "Error: {}");
        println!("{out}");
    } else {
        println!("{}", report.description);
        if !report.complete {
            eprintln!("warning: no complete derivation ({} hypotheses built)", report.hypotheses);
        }
    }
}

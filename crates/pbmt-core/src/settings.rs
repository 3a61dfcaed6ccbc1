//! Decoder settings loaded from TOML.
//!
//! - `parse_settings_toml(content)` parses and validates a settings file
//! - `settings()` returns `&'static Settings` built from the embedded defaults
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Settings are read-only once decoding starts; components take the values
//! they need at construction time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Get or initialize the default settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).expect("embedded settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub unknown_words: UnknownWordSettings,
    pub features: FeatureSettings,
    pub table: TableSettings,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnknownWordSettings {
    /// Delete unknown tokens outside the working alphabet instead of copying them.
    pub drop: bool,
    pub score_name: String,
    pub score: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    pub translation_model: bool,
    pub rule_shape: bool,
    pub linear_distortion: bool,
    pub word_penalty: bool,
    #[serde(default)]
    pub domain_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    pub score_names: Vec<String>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        };
    }
    check_non_empty!(unknown_words.score_name);
    check_non_empty!(table.score_names);

    if !s.unknown_words.score.is_finite() {
        return Err(SettingsError::InvalidValue {
            field: "unknown_words.score".to_string(),
            reason: "must be finite".to_string(),
        });
    }
    let mut seen = std::collections::HashSet::new();
    for name in &s.table.score_names {
        if name.is_empty() || !seen.insert(name.as_str()) {
            return Err(SettingsError::InvalidValue {
                field: "table.score_names".to_string(),
                reason: format!("score name {name:?} is empty or repeated"),
            });
        }
    }
    for (feature, weight) in &s.weights {
        if !weight.is_finite() {
            return Err(SettingsError::InvalidValue {
                field: format!("weights.{feature}"),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}

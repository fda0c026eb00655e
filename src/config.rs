//! Router configuration
//!
//! Defaults reproduce the tuned values the cascade was built around;
//! every one of them can be overridden from the environment.

use crate::error::RouterError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_KEYWORD_THRESHOLD: f64 = 0.7;
pub const DEFAULT_EMBEDDING_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LLM_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Constants of the keyword scoring formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordScoring {
    /// Per-match bonus in `(hits / total) * (1 + hits * bonus)`
    pub match_bonus: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for KeywordScoring {
    fn default() -> Self {
        Self {
            match_bonus: 0.1,
            min_confidence: 0.5,
            max_confidence: 0.99,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub keyword_threshold: f64,
    pub embedding_threshold: f64,
    pub enable_embedding: bool,
    pub enable_llm: bool,
    pub scoring: KeywordScoring,
    /// Confidence used when the model omits one or returns it out of range
    pub llm_default_confidence: f64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub llm_timeout: Duration,
    pub embedding_dimension: usize,
    /// Catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            keyword_threshold: DEFAULT_KEYWORD_THRESHOLD,
            embedding_threshold: DEFAULT_EMBEDDING_THRESHOLD,
            enable_embedding: true,
            enable_llm: true,
            scoring: KeywordScoring::default(),
            llm_default_confidence: DEFAULT_LLM_CONFIDENCE,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            llm_timeout: Duration::from_secs(30),
            embedding_dimension: crate::embedding::DEFAULT_DIMENSION,
            catalog_path: None,
        }
    }
}

impl RouterConfig {
    /// Keyword stage only, no optional backends
    pub fn keyword_only() -> Self {
        Self {
            enable_embedding: false,
            enable_llm: false,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            keyword_threshold: parse_var("KEYWORD_THRESHOLD")?
                .unwrap_or(defaults.keyword_threshold),
            embedding_threshold: parse_var("EMBEDDING_THRESHOLD")?
                .unwrap_or(defaults.embedding_threshold),
            enable_embedding: parse_flag("ENABLE_EMBEDDING")?
                .unwrap_or(defaults.enable_embedding),
            enable_llm: parse_flag("ENABLE_LLM")?.unwrap_or(defaults.enable_llm),
            scoring: defaults.scoring,
            llm_default_confidence: defaults.llm_default_confidence,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            llm_timeout: parse_var::<u64>("LLM_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.llm_timeout),
            embedding_dimension: parse_var("EMBEDDING_DIMENSION")?
                .unwrap_or(defaults.embedding_dimension),
            catalog_path: env::var("INTENT_CATALOG_PATH").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("keyword_threshold", self.keyword_threshold),
            ("embedding_threshold", self.embedding_threshold),
            ("llm_default_confidence", self.llm_default_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RouterError::ConfigError(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.scoring.min_confidence > self.scoring.max_confidence {
            return Err(RouterError::ConfigError(
                "keyword min_confidence exceeds max_confidence".to_string(),
            ));
        }

        if self.embedding_dimension == 0 {
            return Err(RouterError::ConfigError(
                "embedding dimension must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            RouterError::ConfigError(format!("{} has an invalid value: {}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(RouterError::ConfigError(format!(
                "{} must be a boolean, got {}",
                name, raw
            ))),
        },
        Err(_) => Ok(None),
    }
}

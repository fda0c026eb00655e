//! Generative classifier (stage 3)
//!
//! Asks a language model to pick one catalog intent for the query. The only
//! stage that awaits. Every failure (transport, malformed output, an intent
//! the catalog does not know) is logged and turned into a miss.

use crate::catalog::IntentCatalog;
use crate::extractor::ParameterExtractor;
use crate::models::{ClassificationMethod, ClassificationResult};
use crate::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub mod gemini;
pub use gemini::GeminiClient;

/// Keywords shown per intent in the prompt
const PROMPT_KEYWORDS: usize = 3;

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"\{[^}]+\}").expect("valid JSON object pattern");
}

/// Text-in, text-out language model
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

pub type SharedBackend = Arc<dyn GenerativeBackend>;

/// Backend replying with fixed text, for development and tests
pub struct StaticBackend {
    reply: String,
}

impl StaticBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for StaticBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "static"
    }
}

/// Parsed model answer
#[derive(Debug, Clone, PartialEq)]
pub struct LlmVerdict {
    pub intent: String,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}

pub struct GenerativeClassifier {
    backend: SharedBackend,
    catalog: Arc<IntentCatalog>,
    extractor: ParameterExtractor,
    default_confidence: f64,
}

impl GenerativeClassifier {
    pub fn new(backend: SharedBackend, catalog: Arc<IntentCatalog>, default_confidence: f64) -> Self {
        Self {
            backend,
            extractor: ParameterExtractor::new(catalog.clone()),
            catalog,
            default_confidence,
        }
    }

    pub fn build_prompt(&self, query: &str) -> String {
        let intents = self
            .catalog
            .intents()
            .map(|intent| {
                let keywords: Vec<&str> = intent
                    .keywords
                    .iter()
                    .take(PROMPT_KEYWORDS)
                    .map(String::as_str)
                    .collect();
                format!(
                    "- {}: {} (keywords: {})",
                    intent.id,
                    intent.description,
                    keywords.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are an intent classifier for a stock-market data API.
Choose the single intent that best matches the user query.

Available intents:
{}

User query: "{}"

Respond with a JSON object only:
{{"intent": "<intent_id>", "confidence": <0.0-1.0>, "reasoning": "<one sentence>"}}
"#,
            intents, query
        )
    }

    /// Catalog intent chosen by the model, or `None` on any failure
    pub async fn classify(&self, query: &str) -> Option<ClassificationResult> {
        let start = Instant::now();
        let prompt = self.build_prompt(query);

        let response = match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(model = self.backend.model_name(), "LLM classification failed: {}", e);
                return None;
            }
        };

        let Some(verdict) = parse_verdict(&response) else {
            debug!(raw = %response, "No usable JSON object in LLM response");
            return None;
        };

        let intent = match self.catalog.require(&verdict.intent) {
            Ok(intent) => intent,
            Err(e) => {
                warn!("LLM proposed an intent outside the catalog: {}", e);
                return None;
            }
        };

        if let Some(reasoning) = &verdict.reasoning {
            debug!(intent = %intent.id, %reasoning, "LLM verdict");
        }

        let confidence = verdict
            .confidence
            .filter(|c| (0.0..=1.0).contains(c))
            .unwrap_or(self.default_confidence);
        let parameters = self.extractor.extract(query, &intent.id);

        Some(ClassificationResult::resolved(
            intent,
            confidence,
            ClassificationMethod::Llm,
            parameters,
            start.elapsed().as_secs_f64() * 1000.0,
        ))
    }
}

/// First flat `{...}` in the text, parsed; requires a string `intent`
pub fn parse_verdict(text: &str) -> Option<LlmVerdict> {
    let raw = JSON_OBJECT.find(text)?.as_str();
    let value: Value = serde_json::from_str(raw).ok()?;

    let intent = value.get("intent")?.as_str()?.trim().to_string();
    if intent.is_empty() {
        return None;
    }

    Some(LlmVerdict {
        intent,
        confidence: value.get("confidence").and_then(Value::as_f64),
        reasoning: value
            .get("reasoning")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

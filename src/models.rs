//! Core data models for intent routing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Extracted call parameters (`ticker`, `date`, `market`, ...)
pub type Parameters = BTreeMap<String, serde_json::Value>;

/// Intent id returned when every stage misses
pub const UNKNOWN_INTENT: &str = "unknown";

/// Endpoint marker for intents composed of several operations
pub const MULTI_ENDPOINT: &str = "MULTI";

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    Keyword,
    Embedding,
    Llm,
    None,
}

/// Structured operation an intent maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Path(String),
    /// Answered by combining multiple operations
    Multi,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Self {
        if raw == MULTI_ENDPOINT {
            Endpoint::Multi
        } else {
            Endpoint::Path(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::Path(path) => path,
            Endpoint::Multi => MULTI_ENDPOINT,
        }
    }
}

//
// ================= Intent =================
//

#[derive(Debug, Clone)]
pub struct IntentDefinition {
    pub id: String,
    pub keywords: Vec<String>,
    pub endpoint: Endpoint,
    pub requires_login: bool,
    /// Parameter names the endpoint expects
    pub parameters: Vec<String>,
    pub description: String,
    /// Representative utterances used to build the reference embedding
    pub examples: Vec<String>,
}

//
// ================= Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub intent: String,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub parameters: Parameters,
    pub endpoint: String,
    pub requires_login: bool,
    pub latency_ms: f64,
}

impl ClassificationResult {
    /// Result resolved to a catalog intent
    pub fn resolved(
        intent: &IntentDefinition,
        confidence: f64,
        method: ClassificationMethod,
        parameters: Parameters,
        latency_ms: f64,
    ) -> Self {
        Self {
            intent: intent.id.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            method,
            parameters,
            endpoint: intent.endpoint.as_str().to_string(),
            requires_login: intent.requires_login,
            latency_ms: latency_ms.max(0.0),
        }
    }

    /// Bottom value when no stage produced an answer
    pub fn unknown(latency_ms: f64) -> Self {
        Self {
            intent: UNKNOWN_INTENT.to_string(),
            confidence: 0.0,
            method: ClassificationMethod::None,
            parameters: Parameters::new(),
            endpoint: String::new(),
            requires_login: false,
            latency_ms: latency_ms.max(0.0),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.intent == UNKNOWN_INTENT
    }
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassificationMethod::Keyword => "keyword",
            ClassificationMethod::Embedding => "embedding",
            ClassificationMethod::Llm => "llm",
            ClassificationMethod::None => "none",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_serialization() {
        let json = serde_json::to_value(ClassificationResult::unknown(1.5)).unwrap();

        assert_eq!(json["intent"], "unknown");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["method"], "none");
        assert_eq!(json["endpoint"], "");
        assert_eq!(json["requires_login"], false);
        assert!(json["parameters"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_multi_endpoint_round_trip() {
        assert_eq!(Endpoint::parse("MULTI"), Endpoint::Multi);
        assert_eq!(Endpoint::Multi.as_str(), "MULTI");
        assert_eq!(
            Endpoint::parse("/api/etf/all").as_str(),
            "/api/etf/all"
        );
    }
}

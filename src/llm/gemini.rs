//! Gemini API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::GenerativeBackend;
use crate::error::RouterError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Credential travels in a header so it never appears in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

const SYSTEM_PROMPT: &str =
    "You route stock-market questions to API intents. Reply with one JSON object and nothing else.";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl GeminiClient {
    /// Fails when the credential is empty or the HTTP client cannot be built
    pub fn new(api_key: String, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RouterError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            url: format!("{}/{}:generateContent", BASE_URL, model),
        })
    }

    /// Single generateContent round trip, returning the first candidate's text
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 256,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
        };

        info!(model = %self.model, "Calling Gemini API");

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Gemini API request failed: {}", e);
                RouterError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response ({}): {}", status, error_text);
            return Err(RouterError::LlmError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse Gemini response: {}", e);
            RouterError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        first_candidate_text(gemini_response)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn first_candidate_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| RouterError::LlmError("No response from Gemini API".to_string()))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" && reason != "MAX_TOKENS" {
            return Err(RouterError::LlmError(format!(
                "Gemini stopped with {}",
                reason
            )));
        }
    }

    candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| RouterError::LlmError("Empty response from Gemini".to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

//! Google Gemini client for reply suggestion generation
//!
//! Sends one `generateContent` request per generation, asking for structured
//! JSON output (an array of `{tone, text}` objects). The response text is
//! parsed here; what the model returns is accepted as-is without asserting a
//! suggestion count or a fixed tone set.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::SuggestionBackend;
use crate::config::GeneratorConfig;
use crate::types::error::{OrchestratedError, Result};
use crate::types::Suggestion;

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// Content block for the Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<ContentPart>,
}

/// Text part of a content block
#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

/// Generation configuration requesting structured JSON output
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
}

/// Suggestion entry as the model emits it
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    tone: String,
    text: String,
}

/// JSON schema for the requested output: an array of `{tone, text}` objects
fn suggestion_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "tone": { "type": "STRING", "description": "The tone of the suggestion" },
                "text": { "type": "STRING", "description": "The suggested reply text" }
            },
            "required": ["tone", "text"]
        }
    })
}

/// Parse the model's response text as a suggestion array
///
/// The tone labels are carried through verbatim; nothing about the count or
/// the label set is enforced here.
pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>> {
    let raw: Vec<RawSuggestion> = serde_json::from_str(text.trim())
        .map_err(|e| OrchestratedError::Parse(format!("suggestion output not valid JSON: {}", e)))?;

    Ok(raw
        .into_iter()
        .map(|s| Suggestion {
            tone: s.tone.into(),
            text: s.text,
        })
        .collect())
}

/// Gemini-backed suggestion generator
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client from generator configuration
    ///
    /// Returns an error when no API key is configured; callers can fall back
    /// to a disabled backend in that case.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                OrchestratedError::Config("generator.api_key is not configured".to_string())
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                OrchestratedError::Config(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![ContentPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: suggestion_schema(),
            },
        }
    }
}

#[async_trait]
impl SuggestionBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<Suggestion>> {
        let url = self.build_url();
        let request = Self::build_request(prompt);

        debug!("Requesting suggestions from model {}", self.model);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OrchestratedError::Network(format!("generator request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratedError::Generator(format!(
                "generator returned status {}",
                status
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            OrchestratedError::Parse(format!("failed to parse generator response: {}", e))
        })?;

        if let Some(error) = parsed.error {
            return Err(OrchestratedError::Generator(
                error.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let text = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|mut c| c.parts.drain(..).next())
            .map(|p| p.text)
            .ok_or_else(|| {
                OrchestratedError::Generator("generator response had no candidates".to_string())
            })?;

        parse_suggestions(&text)
    }
}

/// Backend used when no generator API key is configured
///
/// Every generation fails with a config error; the orchestrator degrades
/// that to an empty suggestion set, so the rest of the engine keeps working.
pub struct DisabledGenerator;

#[async_trait]
impl SuggestionBackend for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Vec<Suggestion>> {
        Err(OrchestratedError::Generator(
            "no suggestion generator configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SuggestionTone;

    #[test]
    fn test_parse_well_formed_suggestions() {
        let text = r#"[
            {"tone": "Professional", "text": "Thank you for reaching out."},
            {"tone": "Friendly", "text": "Hey, great to hear from you!"},
            {"tone": "Casual", "text": "hey! sounds good"}
        ]"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].tone, SuggestionTone::Professional);
        assert_eq!(suggestions[2].text, "hey! sounds good");
    }

    #[test]
    fn test_parse_accepts_unexpected_tones_and_counts() {
        let text = r#"[{"tone": "Diplomatic", "text": "Let me check."}]"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(
            suggestions[0].tone,
            SuggestionTone::Other("Diplomatic".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let result = parse_suggestions("I'm sorry, I can't produce JSON right now.");
        assert!(matches!(result, Err(OrchestratedError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let result = parse_suggestions(r#"{"tone": "Casual", "text": "hello"}"#);
        assert!(matches!(result, Err(OrchestratedError::Parse(_))));
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            GeminiClient::new(&config),
            Err(OrchestratedError::Config(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = GeminiClient::build_request("Conversation:\nThem: hi");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Conversation:\nThem: hi"
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }
}

//! Gemini `generateContent` client used as the default content generator.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::enrich::{build_prompt, ContentGenerator, GeneratedContent};
use crate::{Error, MockgenConfig, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::Other(_) => None,
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Schema the model's JSON answer must follow
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "headline": { "type": "STRING" },
            "description": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["headline", "description", "tags"]
    })
}

pub fn build_request(url: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::Text { text: build_prompt(url) }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Blocking Gemini client
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    /// The key is checked lazily: without one every call fails with
    /// [`Error::ConfigError`].
    pub fn new(config: &MockgenConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, key: &str) -> Result<Url> {
        let raw = format!("{}/models/{}:generateContent", self.base_url, self.model);
        Url::parse_with_params(&raw, &[("key", key)])
            .map_err(|e| Error::ConfigError(format!("Invalid Gemini endpoint {}: {}", raw, e)))
    }
}

impl ContentGenerator for GeminiGenerator {
    fn generate(&self, url: &str) -> Result<GeneratedContent> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("No Gemini API key (set GEMINI_API_KEY)".into()))?;
        let endpoint = self.endpoint(key)?;
        debug!("Gemini generate_content: model={}", self.model);

        let resp = self.client.post(endpoint).json(&build_request(url)).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::GenerationError(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        let text = parsed
            .first_text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::GenerationError("No response from Gemini".into()))?;
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_camel_case() {
        let v = serde_json::to_value(build_request("example.com")).unwrap();
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(v["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(v["contents"][0]["role"], "user");
        assert!(v["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("example.com"));
    }

    #[test]
    fn first_text_skips_non_text_parts() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"inlineData":{}},{"text":"{}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_text(), Some("{}"));
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.first_text().is_none());
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let generator = GeminiGenerator::new(&MockgenConfig::default()).unwrap();
        assert!(!generator.has_key());
        assert!(matches!(generator.generate("example.com"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn endpoint_carries_model_and_key() {
        let cfg = MockgenConfig {
            gemini_api_key: Some("k 1".into()),
            ..Default::default()
        };
        let generator = GeminiGenerator::new(&cfg).unwrap();
        let url = generator.endpoint("k 1").unwrap();
        assert_eq!(url.path(), "/v1beta/models/gemini-2.5-flash:generateContent");
        assert_eq!(url.query(), Some("key=k+1"));
    }
}

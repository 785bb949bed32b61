//! Gemini `generateContent` client.
//!
//! Uses reqwest with the key in the `x-goog-api-key` header. One request per
//! call; no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{AiGateway, GatewayConfig, GatewayError, GenerateRequest};

/// Error bodies are cut to this many characters before surfacing.
const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {}", e)))?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            log::warn!("API_KEY is missing. AI features will not work.");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;
        let body = build_request_body(&request);

        log::debug!("Gemini: {:?} request to {}", request.kind, self.model);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), &text));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("response is not JSON: {}", e)))?;

        extract_text(&data).ok_or(GatewayError::EmptyReply)
    }
}

/// `generateContent` body for one user turn.
pub fn build_request_body(request: &GenerateRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    });
    if let Some(schema) = &request.response_schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    body
}

/// Concatenated text parts of the first candidate, if any text is present.
pub fn extract_text(data: &Value) -> Option<String> {
    let parts = data["candidates"].get(0)?["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn error_for_status(status: u16, body: &str) -> GatewayError {
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    match status {
        401 | 403 => GatewayError::Unauthorized(body),
        _ => GatewayError::Unavailable { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RequestKind;

    #[test]
    fn test_request_body_with_schema() {
        let body = build_request_body(&GenerateRequest {
            kind: RequestKind::Score,
            prompt: "score this".to_string(),
            response_schema: Some(json!({"type": "OBJECT"})),
        });
        assert_eq!(body["contents"][0]["parts"][0]["text"], "score this");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_request_body_plain_text() {
        let body = build_request_body(&GenerateRequest {
            kind: RequestKind::Draft,
            prompt: "draft".to_string(),
            response_schema: None,
        });
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts_and_skips_thoughts() {
        let data = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "{\"score\": 85," },
                        { "text": " \"reasoning\": \"r\", \"intent\": \"High\"}" }
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(
            extract_text(&data).as_deref(),
            Some("{\"score\": 85, \"reasoning\": \"r\", \"intent\": \"High\"}")
        );
    }

    #[test]
    fn test_extract_text_no_candidates() {
        assert!(extract_text(&json!({ "candidates": [] })).is_none());
        assert!(extract_text(&json!({ "promptFeedback": { "blockReason": "SAFETY" } })).is_none());
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(extract_text(&blank).is_none());
    }

    #[test]
    fn test_error_for_status_classification() {
        assert!(matches!(error_for_status(403, "denied"), GatewayError::Unauthorized(_)));
        assert!(matches!(
            error_for_status(503, "overloaded"),
            GatewayError::Unavailable { status: 503, .. }
        ));
        let long = "x".repeat(1000);
        match error_for_status(500, &long) {
            GatewayError::Unavailable { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_before_network() {
        let gateway = GeminiGateway {
            client: Client::new(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            api_key: None,
        };
        let result = gateway
            .generate(GenerateRequest {
                kind: RequestKind::Score,
                prompt: "p".to_string(),
                response_schema: None,
            })
            .await;
        assert!(matches!(result, Err(GatewayError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = GatewayConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            model: "m".to_string(),
            api_key: Some("k".to_string()),
            timeout_secs: 5,
        };
        let gateway = GeminiGateway::new(&config).unwrap();
        assert_eq!(gateway.endpoint(), "https://example.test/v1beta/models/m:generateContent");
    }
}

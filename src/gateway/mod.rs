//! AI gateway: the hosted model that scores leads, drafts outreach and
//! answers pipeline questions.
//!
//! The transport sits behind [`AiGateway`], a single `generate` call. The
//! contracts on top of it (scoring, drafting, chat) live here as free
//! functions so every transport gets the same validation and fallbacks.

pub mod gemini;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{IntentLevel, Lead, LeadAssessment};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted, in order, when the config has no key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Reply used by the assistant when the model is unreachable or silent.
pub const CHAT_FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble processing that request right now. How else can I help with your sales strategy?";

/// Gateway configuration, the `gateway` block of ~/.linkpulse/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    /// Configured key, else the first non-empty key from [`API_KEY_ENV_VARS`].
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|k| !k.trim().is_empty())
            })
    }
}

/// Errors from gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No API key configured for the AI gateway")]
    MissingApiKey,
    #[error("AI gateway rejected the credential: {0}")]
    Unauthorized(String),
    #[error("AI gateway request failed: {0}")]
    Network(String),
    #[error("AI gateway error {status}: {body}")]
    Unavailable { status: u16, body: String },
    #[error("AI gateway returned no text")]
    EmptyReply,
    #[error("Malformed AI gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn requires_user_action(&self) -> bool {
        matches!(self, GatewayError::MissingApiKey | GatewayError::Unauthorized(_))
    }
}

/// Which contract a request serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Score,
    Draft,
    Chat,
}

/// One prompt sent to the model.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub kind: RequestKind,
    pub prompt: String,
    /// When set, the model is asked for JSON matching this schema.
    pub response_schema: Option<Value>,
}

/// Hosted model transport. Returns the model's raw reply text.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError>;
}

/// Build the production gateway from config.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn AiGateway>, GatewayError> {
    Ok(Arc::new(gemini::GeminiGateway::new(config)?))
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Scoring contract: `{score: 0..=100, reasoning, intent: Low|Medium|High}`.
pub async fn score_lead(
    gateway: &dyn AiGateway,
    lead: &Lead,
) -> Result<LeadAssessment, GatewayError> {
    let reply = gateway
        .generate(GenerateRequest {
            kind: RequestKind::Score,
            prompt: prompts::scoring_prompt(lead),
            response_schema: Some(prompts::scoring_schema()),
        })
        .await?;
    parse_assessment(&reply)
}

/// Drafting contract. An empty reply falls back to [`fallback_message`];
/// transport failures propagate.
pub async fn draft_outreach(gateway: &dyn AiGateway, lead: &Lead) -> Result<String, GatewayError> {
    let result = gateway
        .generate(GenerateRequest {
            kind: RequestKind::Draft,
            prompt: prompts::outreach_prompt(lead),
            response_schema: None,
        })
        .await;

    match result {
        Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Ok(_) | Err(GatewayError::EmptyReply) => {
            log::info!("Gateway: empty draft for {}, using template", lead.id);
            Ok(fallback_message(lead))
        }
        Err(e) => Err(e),
    }
}

/// Deterministic outreach used when the model drafts nothing.
pub fn fallback_message(lead: &Lead) -> String {
    format!(
        "Hi {}, I'd love to connect and learn more about your work at {}.",
        lead.name, lead.company
    )
}

/// Chat contract. Never fails: any error or empty reply becomes
/// [`CHAT_FALLBACK_REPLY`].
pub async fn chat_with_assistant(
    gateway: &dyn AiGateway,
    message: &str,
    leads: &[Lead],
    context_limit: usize,
) -> String {
    let result = gateway
        .generate(GenerateRequest {
            kind: RequestKind::Chat,
            prompt: prompts::chat_prompt(message, leads, context_limit),
            response_schema: None,
        })
        .await;

    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => CHAT_FALLBACK_REPLY.to_string(),
        Err(e) => {
            log::warn!("Gateway: chat failed: {}", e);
            CHAT_FALLBACK_REPLY.to_string()
        }
    }
}

/// Validate a scoring reply. Out-of-range or non-numeric scores are errors,
/// never clamped.
pub fn parse_assessment(reply: &str) -> Result<LeadAssessment, GatewayError> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(GatewayError::EmptyReply);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::Malformed(format!("scoring reply is not JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| GatewayError::Malformed("scoring reply is not an object".to_string()))?;

    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::Malformed("score missing or not a number".to_string()))?;
    if !(0.0..=100.0).contains(&score) {
        return Err(GatewayError::Malformed(format!("score {} out of range", score)));
    }

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::Malformed("reasoning missing".to_string()))?;

    let intent_raw = obj
        .get("intent")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::Malformed("intent missing".to_string()))?;
    let intent = IntentLevel::parse(intent_raw)
        .ok_or_else(|| GatewayError::Malformed(format!("unknown intent '{}'", intent_raw)))?;

    Ok(LeadAssessment {
        score,
        reasoning: reasoning.to_string(),
        intent,
    })
}

/// Models sometimes wrap JSON in a ``` fence despite the JSON mime type.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

//! Gemini-backed implementation of the `ModelGateway` trait.

use async_trait::async_trait;
use leadline_core::config::GeminiConfig;
use leadline_core::{ConversationTurn, LeadPatch, Suggestion};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::GatewayError;
use crate::{payload, response, ModelGateway};

/// Reply used when a chat call succeeds but carries no candidate text.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm having trouble connecting right now.";

pub struct GeminiGateway {
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn from_config(cfg: &GeminiConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|error| GatewayError::Other(error.to_string()))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            client,
        })
    }

    fn generate_url(&self, api_key: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent?key={}", self.base_url, self.model, api_key)
    }

    /// One `generateContent` round trip. No retries: a failure is classified
    /// once and returned to the caller.
    async fn generate(&self, kind: &'static str, body: Value) -> Result<Value, GatewayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GatewayError::Other("no API key configured".to_string()))?;
        let url = self.generate_url(api_key.expose_secret());

        tracing::debug!(call = kind, url = %redact_url_key(&url), "gemini generateContent request");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|error| GatewayError::from_transport(&error))?;

        let status = resp.status();
        let resp_text =
            resp.text().await.map_err(|error| GatewayError::from_transport(&error))?;

        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &resp_text));
        }

        serde_json::from_str(&resp_text)
            .map_err(|error| GatewayError::Other(format!("malformed response body: {error}")))
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn chat(
        &self,
        window: &[ConversationTurn],
        utterance: &str,
    ) -> Result<String, GatewayError> {
        let body = self.generate("chat", payload::chat_body(window, utterance)).await?;
        let text = response::candidate_text(&body)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
        Ok(text)
    }

    async fn extract_lead(
        &self,
        transcript: &[ConversationTurn],
    ) -> Result<LeadPatch, GatewayError> {
        let body = self.generate("extraction", payload::extraction_body(transcript)).await?;
        let text = response::candidate_text(&body)
            .ok_or_else(|| GatewayError::Other("extraction response had no text".to_string()))?;
        response::parse_lead_patch(&text)
    }

    async fn suggest(
        &self,
        last_reply: &str,
        count: usize,
    ) -> Result<Vec<Suggestion>, GatewayError> {
        let body =
            self.generate("suggestions", payload::suggestion_body(last_reply, count)).await?;
        let text = response::candidate_text(&body)
            .ok_or_else(|| GatewayError::Other("suggestion response had no text".to_string()))?;
        response::parse_suggestions(&text)
    }
}

/// Strip the API key from a URL before logging it.
fn redact_url_key(url: &str) -> String {
    if let Some(idx) = url.find("key=") {
        let prefix = &url[..idx + 4];
        let rest = &url[idx + 4..];
        let end = rest.find('&').unwrap_or(rest.len());
        format!("{prefix}[REDACTED]{}", &rest[end..])
    } else {
        url.to_string()
    }
}

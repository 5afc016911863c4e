//! Chat-completion client for the Moonshot (Kimi) API.
//!
//! The wire format is OpenAI-compatible. There is deliberately no
//! retry here: the reply path downgrades any failure to a fixed
//! fallback message, so a failed call is simply reported upward.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Sampling temperature for persona replies
const TEMPERATURE: f32 = 0.7;
/// Hard cap on generated tokens per reply
const MAX_TOKENS: u32 = 1000;

pub struct KimiClient {
    client: Client,
    /// None when no API key is configured; every call then fails fast
    auth_headers: Option<header::HeaderMap>,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl KimiClient {
    pub fn new(api_key: Option<&str>, endpoint: &str, model: &str) -> Self {
        let auth_headers = api_key.and_then(|key| {
            let mut headers = header::HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
            let value = header::HeaderValue::from_str(&format!("Bearer {}", key)).ok()?;
            headers.insert(header::AUTHORIZATION, value);
            Some(headers)
        });

        Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    /// Run a single chat completion and return the reply text.
    pub async fn generate_text(&self, messages: &[ChatMessage]) -> Result<String, String> {
        let headers = self
            .auth_headers
            .clone()
            .ok_or_else(|| "KIMI_API_KEY is not configured".to_string())?;

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::debug!("Sending completion request for {} turns", messages.len());

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Completion request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(format!("Completion API error: {}", parsed.error.message));
            }
            return Err(format!(
                "Completion API returned status {}: {}",
                status, error_text
            ));
        }

        let data: CompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse completion response: {}", e))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err("Completion API returned no content".to_string());
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MessageRole;

    #[test]
    fn request_serializes_sampling_parameters() {
        let messages = vec![ChatMessage {
            role: MessageRole::System,
            content: "You are grandpa".to_string(),
        }];
        let request = CompletionRequest {
            model: "kimi-latest",
            messages: &messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["model"], "kimi-latest");
        let temperature = json["temperature"].as_f64().expect("temperature");
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let client = KimiClient::new(None, "https://example.test/v1/chat/completions", "kimi-latest");
        assert!(client.auth_headers.is_none());
    }

    #[test]
    fn error_body_is_parsed() {
        let body = r#"{"error":{"message":"rate limited","type":"rate_limit"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.error.message, "rate limited");
    }
}

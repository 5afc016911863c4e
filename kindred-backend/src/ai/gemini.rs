//! Streaming generation client (Gemini) for the demo endpoint.
//!
//! The response is server-sent events; chunks are handed to the caller
//! as they arrive with no buffering or retry.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            api_key: api_key.map(|k| k.to_string()),
            model: model.to_string(),
        }
    }

    /// Open a streaming generateContent call and return the raw SSE
    /// response for the caller to relay.
    pub async fn stream_generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<reqwest::Response, String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "GOOGLE_API_KEY is not configured".to_string())?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Streaming request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!(
                "Streaming API returned status {}: {}",
                status, error_text
            ));
        }

        Ok(response)
    }
}

/// Incremental SSE parser: feed raw bytes as they arrive, get back the
/// text of any `data:` events completed so far. Events split across
/// network chunks are reassembled through the internal buffer.
#[derive(Default)]
pub struct SseTextParser {
    buf: String,
}

impl SseTextParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(bytes));

        let mut out = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            let line = line.trim_end();
            let data = match line.strip_prefix("data:") {
                Some(d) => d.trim(),
                None => continue,
            };
            if data == "[DONE]" {
                continue;
            }
            if let Some(text) = extract_chunk_text(data) {
                out.push(text);
            }
        }
        out
    }
}

/// Pull the candidate text out of one streamed chunk payload. Chunks
/// without text parts (safety metadata, usage) yield nothing.
fn extract_chunk_text(data: &str) -> Option<String> {
    let value: Value = serde_json::from_str(data).ok()?;
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}]}}}}]}}\n\n",
            text
        )
    }

    #[test]
    fn parses_complete_events() {
        let mut parser = SseTextParser::new();
        let input = format!("{}{}", chunk("Hello"), chunk(" world"));
        let texts = parser.push(input.as_bytes());
        assert_eq!(texts, vec!["Hello".to_string(), " world".to_string()]);
    }

    #[test]
    fn reassembles_events_split_across_chunks() {
        let mut parser = SseTextParser::new();
        let event = chunk("split across the wire");
        let (head, tail) = event.split_at(25);

        assert!(parser.push(head.as_bytes()).is_empty());
        let texts = parser.push(tail.as_bytes());
        assert_eq!(texts, vec!["split across the wire".to_string()]);
    }

    #[test]
    fn ignores_non_data_lines_and_textless_chunks() {
        let mut parser = SseTextParser::new();
        let input = "event: ping\ndata: {\"usageMetadata\":{\"totalTokenCount\":5}}\ndata: [DONE]\n";
        assert!(parser.push(input.as_bytes()).is_empty());
    }

    #[test]
    fn extracts_concatenated_parts() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#;
        assert_eq!(extract_chunk_text(data), Some("ab".to_string()));
        assert_eq!(extract_chunk_text("{not json"), None);
    }
}

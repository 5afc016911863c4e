//! Text-to-speech passthrough against the hosted IndexTTS Gradio space.
//!
//! Three hops: upload the voice sample, start `/gen_single` with the
//! uploaded file plus the text, then read the result event for the
//! generated audio URL. The audio itself stays on the space; only its
//! URL is returned.

use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct IndexTtsClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    event_id: String,
}

impl IndexTtsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Synthesize `text` in the voice of `sample`. Returns the URL of
    /// the generated audio on the space.
    pub async fn synthesize(
        &self,
        sample: &[u8],
        mime_type: &str,
        file_name: &str,
        text: &str,
    ) -> Result<String, String> {
        let uploaded_path = self.upload_sample(sample, mime_type, file_name).await?;
        let event_id = self.start_generation(&uploaded_path, text).await?;
        self.await_result(&event_id).await
    }

    async fn upload_sample(
        &self,
        sample: &[u8],
        mime_type: &str,
        file_name: &str,
    ) -> Result<String, String> {
        let part = multipart::Part::bytes(sample.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| format!("Invalid sample mime type: {}", e))?;
        let form = multipart::Form::new().part("files", part);

        let response = self
            .client
            .post(format!("{}/gradio_api/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Sample upload failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Sample upload returned status {}",
                response.status()
            ));
        }

        let paths: Vec<String> = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse upload response: {}", e))?;

        paths
            .into_iter()
            .next()
            .ok_or_else(|| "Sample upload returned no file path".to_string())
    }

    async fn start_generation(&self, uploaded_path: &str, text: &str) -> Result<String, String> {
        let body = json!({
            "data": [
                { "path": uploaded_path, "meta": { "_type": "gradio.FileData" } },
                text,
            ]
        });

        let response = self
            .client
            .post(format!("{}/gradio_api/call/gen_single", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Generation call failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Generation call returned status {}",
                response.status()
            ));
        }

        let call: CallResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse generation call response: {}", e))?;

        Ok(call.event_id)
    }

    /// Block on the result event stream and pull out the audio URL.
    async fn await_result(&self, event_id: &str) -> Result<String, String> {
        let response = self
            .client
            .get(format!(
                "{}/gradio_api/call/gen_single/{}",
                self.base_url, event_id
            ))
            .send()
            .await
            .map_err(|e| format!("Result fetch failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Result fetch returned status {}", response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read result stream: {}", e))?;

        // The stream ends with a `data:` line carrying the output array
        let data_line = body
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.trim())
            .filter(|d| !d.is_empty() && *d != "null")
            .last()
            .ok_or_else(|| "Result stream carried no data".to_string())?;

        let data: Value = serde_json::from_str(data_line)
            .map_err(|e| format!("Failed to parse result payload: {}", e))?;

        extract_audio_url(&data).ok_or_else(|| "Result payload carried no audio URL".to_string())
    }
}

/// Pull the generated-audio URL out of the `/gen_single` output array.
/// Newer spaces nest the file under `value`, older ones return the
/// file object directly.
fn extract_audio_url(data: &Value) -> Option<String> {
    let first = data.get(0)?;
    let url = first
        .get("value")
        .and_then(|v| v.get("url"))
        .or_else(|| first.get("url"))?;
    url.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_audio_url() {
        let data = json!([{ "value": { "url": "https://space.test/file/out.wav" } }]);
        assert_eq!(
            extract_audio_url(&data),
            Some("https://space.test/file/out.wav".to_string())
        );
    }

    #[test]
    fn extracts_flat_audio_url() {
        let data = json!([{ "path": "/tmp/out.wav", "url": "https://space.test/out.wav" }]);
        assert_eq!(
            extract_audio_url(&data),
            Some("https://space.test/out.wav".to_string())
        );
    }

    #[test]
    fn missing_url_yields_none() {
        assert_eq!(extract_audio_url(&json!([])), None);
        assert_eq!(extract_audio_url(&json!([{ "path": "/tmp/x" }])), None);
    }
}

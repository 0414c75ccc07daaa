use async_trait::async_trait;
use serde_json::json;

use billwise_core::{error::GenerationError, generator::ContentGenerator};

/// Content Generator adapter for an OpenAI-compatible chat-completions API
/// (Groq by default — the original product used `llama-3.1-8b-instant`).
pub struct LlmGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmGenerator {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ContentGenerator for LlmGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_output_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("generation request failed: {e}")))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("generation response unreadable: {e}")))?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("generation provider returned an error");
            return Err(GenerationError::new(message));
        }

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerationError::new("generation response contained no text"))
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};

use urpaq_core::config::LlmSettings;
use urpaq_core::traits::ChatModel;

use crate::error::LlmError;
use crate::types::{ChatCompletion, ChatRequest, Message};

pub struct Llm7Client {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Llm7Client {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", settings.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| LlmError::InvalidRequest(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        let base_url = settings.base_url.trim_end_matches('/');
        info!("Initialized LLM client with base URL: {} and model: {}", base_url, settings.model);

        Ok(Self {
            client,
            endpoint: format!("{base_url}/chat/completions"),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub async fn complete(&self, prompt: &str) -> Result<ChatCompletion, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!("Sending chat request ({} chars)", prompt.chars().count());

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| LlmError::Serialization(e.to_string()))
    }

    /// The first choice's content.
    pub async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let completion = self.complete(prompt).await?;
        let choice = completion.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        debug!("Received response: {} chars", choice.message.content.chars().count());
        Ok(choice.message.content)
    }
}

#[async_trait]
impl ChatModel for Llm7Client {
    async fn chat(&self, prompt: &str) -> urpaq_core::Result<String> {
        Ok(Llm7Client::chat(self, prompt).await?)
    }
}

//! OpenAI chat-completions translator

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::error_from_response;
use crate::config::TranslationConfig;
use crate::error::TranslationError;
use crate::ports::Translator;

/// Translator backed by an OpenAI chat model
#[derive(Debug, Clone)]
pub struct OpenAITranslator {
    client: Client,
    config: TranslationConfig,
    configured: bool,
}

impl OpenAITranslator {
    /// Create a new OpenAI translator
    ///
    /// A missing API key is allowed; the translator then reports itself as
    /// not configured.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the configuration is invalid.
    pub fn new(config: TranslationConfig) -> Result<Self, TranslationError> {
        config.validate().map_err(TranslationError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                TranslationError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let configured = config.has_openai_key();
        info!(model = %config.model, configured, "Initialized OpenAI translator");

        Ok(Self {
            client,
            config,
            configured,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.openai_base_url)
    }
}

fn system_prompt(source: &str, target: &str) -> String {
    format!(
        "You are a professional classroom interpreter. Translate the user's message \
         from {source} to {target}. Preserve meaning and tone. Reply with the \
         translation only, without quotes or explanations."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Translator for OpenAITranslator {
    #[instrument(skip(self, text), fields(model = %self.config.model, text_len = text.len()))]
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        if !self.configured {
            return Err(TranslationError::NotAvailable(
                "OpenAI API key is not configured".to_string(),
            ));
        }

        let prompt = system_prompt(source, target);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(self.config.openai_api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            TranslationError::InvalidResponse(format!("Failed to parse response: {e}"))
        })?;

        let translated = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                TranslationError::InvalidResponse("Model returned no translation".to_string())
            })?;

        debug!(translated_len = translated.len(), "Translation complete");
        Ok(translated)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

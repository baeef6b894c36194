//! MyMemory public translation API
//!
//! Free and keyless, so it always reports itself as configured. Inputs
//! longer than `max_chars` are truncated before sending, and transient
//! failures are retried with exponential backoff inside a single call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use resilience::with_retry;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{error_from_response, truncate_chars};
use crate::config::{MyMemoryConfig, TranslationConfig};
use crate::error::TranslationError;
use crate::ports::Translator;

/// Translator backed by the MyMemory `/get` endpoint
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    client: Client,
    config: MyMemoryConfig,
}

impl MyMemoryTranslator {
    /// Create a new MyMemory translator
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the configuration is invalid.
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        config.validate().map_err(TranslationError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                TranslationError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config: config.mymemory.clone(),
        })
    }

    async fn request_once(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let langpair = format!("{source}|{target}");
        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = self.config.email.as_deref() {
            query.push(("de", email));
        }

        let response = self
            .client
            .get(format!("{}/get", self.config.base_url))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: MyMemoryResponse = response.json().await.map_err(|e| {
            TranslationError::InvalidResponse(format!("Failed to parse response: {e}"))
        })?;

        body.into_translation()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: ResponseData,
    // Sent as a number on success and sometimes as a string on errors.
    #[serde(default)]
    response_status: Option<Value>,
    #[serde(default)]
    response_details: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    translated_text: Option<String>,
}

impl MyMemoryResponse {
    fn status(&self) -> u16 {
        let status = match &self.response_status {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        status.unwrap_or(200)
    }

    fn into_translation(self) -> Result<String, TranslationError> {
        let status = self.status();
        if status != 200 {
            let message = match self.response_details {
                Some(Value::String(s)) if !s.is_empty() => s,
                _ => self
                    .response_data
                    .translated_text
                    .unwrap_or_else(|| "MyMemory request failed".to_string()),
            };
            return Err(TranslationError::Api { status, message });
        }

        self.response_data
            .translated_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TranslationError::InvalidResponse("MyMemory returned no translation".to_string())
            })
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    #[instrument(skip(self, text), fields(text_len = text.chars().count()))]
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let input = truncate_chars(text, self.config.max_chars);
        if input.len() < text.len() {
            warn!(
                max_chars = self.config.max_chars,
                original_chars = text.chars().count(),
                "Input exceeds MyMemory limit, truncating"
            );
        }

        let outcome = with_retry(&self.config.retry, || {
            self.request_once(input, source, target)
        })
        .await;

        debug!(attempts = outcome.attempts, ok = outcome.is_ok(), "MyMemory call finished");
        outcome.into_result()
    }

    fn provider_name(&self) -> &str {
        "mymemory"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience::RetryConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_translator(mock_server: &MockServer) -> MyMemoryTranslator {
        let config = TranslationConfig {
            timeout_ms: 5000,
            mymemory: MyMemoryConfig {
                base_url: mock_server.uri(),
                retry: RetryConfig::new(10, 40, 2.0, 3),
                ..Default::default()
            },
            ..Default::default()
        };
        MyMemoryTranslator::new(&config).unwrap()
    }

    fn ok_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "responseData": {"translatedText": text, "match": 1},
            "responseStatus": 200,
            "responseDetails": ""
        })
    }

    #[tokio::test]
    async fn translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("q", "Bonjour le monde"))
            .and(query_param("langpair", "fr|en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Hello world")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_test_translator(&mock_server);
        let translated = translator
            .translate("Bonjour le monde", "fr", "en")
            .await
            .unwrap();

        assert_eq!(translated, "Hello world");
    }

    #[tokio::test]
    async fn retries_transient_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Hello")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_test_translator(&mock_server);
        let translated = translator.translate("Bonjour", "fr", "en").await.unwrap();

        assert_eq!(translated, "Hello");
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(429))
            .expect(4)
            .mount(&mock_server)
            .await;

        let translator = create_test_translator(&mock_server);
        let err = translator.translate("Bonjour", "fr", "en").await.unwrap_err();

        assert_eq!(err.status_code(), Some(429));
    }

    #[tokio::test]
    async fn vendor_status_in_body_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responseData": {"translatedText": "'XX' IS AN INVALID TARGET LANGUAGE"},
                "responseStatus": "403",
                "responseDetails": "'XX' IS AN INVALID TARGET LANGUAGE"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_test_translator(&mock_server);
        let err = translator.translate("Bonjour", "fr", "xx").await.unwrap_err();

        assert!(matches!(err, TranslationError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn long_input_is_truncated() {
        let mock_server = MockServer::start().await;
        let long_text = "é".repeat(600);
        let expected = "é".repeat(500);

        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("q", expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("e")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_test_translator(&mock_server);
        let translated = translator.translate(&long_text, "fr", "en").await.unwrap();

        assert_eq!(translated, "e");
    }

    #[test]
    fn status_parses_number_and_string() {
        let numeric: MyMemoryResponse = serde_json::from_value(ok_body("x")).unwrap();
        assert_eq!(numeric.status(), 200);

        let string: MyMemoryResponse = serde_json::from_value(serde_json::json!({
            "responseData": {"translatedText": null},
            "responseStatus": "429"
        }))
        .unwrap();
        assert_eq!(string.status(), 429);
    }
}

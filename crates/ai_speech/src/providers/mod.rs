//! Speech provider implementations

pub mod deepgram;
pub mod elevenlabs;
pub mod openai;
pub mod whisper_cpp;

use serde::Deserialize;

use crate::error::SpeechError;

/// OpenAI-style error envelope, also used by several other vendors
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

/// Flat error body (`{"err_msg": ...}` or `{"detail": {"message": ...}}`)
#[derive(Debug, Deserialize)]
struct FlatApiError {
    #[serde(default, alias = "err_msg")]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Convert a non-success response into a `SpeechError`
pub(crate) async fn error_from_response(response: reqwest::Response) -> SpeechError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

fn error_from_body(status: u16, body: &str) -> SpeechError {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        if api_error.error.code.as_deref() == Some("rate_limit_exceeded") {
            return SpeechError::RateLimited;
        }
        return SpeechError::Api {
            status,
            message: api_error.error.message,
        };
    }

    let message = serde_json::from_str::<FlatApiError>(body)
        .ok()
        .and_then(|flat| {
            flat.message.or_else(|| {
                flat.detail.map(|detail| {
                    detail
                        .get("message")
                        .or(Some(&detail))
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| detail.to_string(), ToString::to_string)
                })
            })
        })
        .unwrap_or_else(|| body.trim().to_string());

    SpeechError::Api { status, message }
}

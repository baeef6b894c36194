//! Translation provider implementations

pub mod mymemory;
pub mod openai;

use serde::Deserialize;

use crate::error::TranslationError;

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

/// Convert a non-success response into a `TranslationError`
pub(crate) async fn error_from_response(response: reqwest::Response) -> TranslationError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) if api_error.error.code.as_deref() == Some("rate_limit_exceeded") => {
            TranslationError::RateLimited
        },
        Ok(api_error) => TranslationError::Api {
            status,
            message: api_error.error.message,
        },
        Err(_) => TranslationError::Api {
            status,
            message: body.trim().to_string(),
        },
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

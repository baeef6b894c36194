//! Port definition for translation adapters

use async_trait::async_trait;

use crate::error::TranslationError;

/// Port for text translation implementations
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`
    ///
    /// Language codes are BCP-47 style tags (`"fr"`, `"en-US"`).
    ///
    /// # Errors
    ///
    /// Returns `TranslationError` if the vendor call fails.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;

    /// Stable provider name
    fn provider_name(&self) -> &str;

    /// Whether credentials needed for a call are present
    fn is_configured(&self) -> bool;
}

//! Language code value object
//!
//! A BCP-47 style tag restricted to what the relay needs: a two or three
//! letter primary language subtag and an optional region/script subtag.
//!
//! # Examples
//!
//! ```
//! use domain::LanguageCode;
//!
//! let code = LanguageCode::new(" EN-us ").unwrap();
//! assert_eq!(code.as_str(), "en-us");
//! assert_eq!(code.primary(), "en");
//!
//! assert!(LanguageCode::new("english").is_err());
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated, normalized language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create a new language code, normalizing case, whitespace and `_` separators
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidLanguageCode`] when the primary subtag is not
    /// 2-3 ASCII letters or the optional subtag is not 2-8 ASCII alphanumerics.
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let raw = code.into();
        let value = raw.trim().to_ascii_lowercase().replace('_', "-");

        let mut parts = value.split('-');
        let primary = parts.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(DomainError::InvalidLanguageCode(raw));
        }

        for subtag in parts {
            if !(2..=8).contains(&subtag.len())
                || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(DomainError::InvalidLanguageCode(raw));
            }
        }

        Ok(Self(value))
    }

    /// Get the full normalized code
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag (`"pt"` for `"pt-br"`)
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

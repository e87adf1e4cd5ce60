//! Target language codes

use crate::error::{PbixError, Result};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted code length (covers tags such as `zh-hant` or `sr-latn-rs`).
pub const MAX_LANGUAGE_CODE_LEN: usize = 16;

/// Validated, normalized target language code (e.g. `de`, `pt-br`).
///
/// Input is trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Normalize and validate a language code.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_lowercase();
        let reject = |reason: &str| PbixError::InvalidLanguage {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(reject("code is empty"));
        }
        if normalized.len() > MAX_LANGUAGE_CODE_LEN {
            return Err(reject("code is too long"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(reject("only ASCII letters, digits, '-' and '_' are allowed"));
        }

        Ok(Self(normalized))
    }

    /// Code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LanguageCode {
    type Err = PbixError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(LanguageCode::parse("  DE ").unwrap().as_str(), "de");
        assert_eq!(LanguageCode::parse("pt-BR").unwrap().as_str(), "pt-br");
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("   ").is_err());
        assert!(LanguageCode::parse("de/../x").is_err());
        assert!(LanguageCode::parse("a".repeat(17).as_str()).is_err());
    }

    #[test]
    fn test_from_str() {
        let code: LanguageCode = "Fr".parse().unwrap();
        assert_eq!(code.to_string(), "fr");
    }
}

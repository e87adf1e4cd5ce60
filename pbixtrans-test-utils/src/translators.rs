//! Stub translators

use pbixtrans_format::{LanguageCode, TranslationError};
use pbixtrans_layout::Translator;
use std::sync::Mutex;

/// Deterministic translator that records every call
pub struct RecordingTranslator {
    transform: fn(&str, &LanguageCode) -> String,
    calls: Mutex<Vec<String>>,
}

impl RecordingTranslator {
    /// Translate with `transform`
    pub fn new(transform: fn(&str, &LanguageCode) -> String) -> Self {
        Self {
            transform,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append `[lang]` to every string
    pub fn tagging() -> Self {
        Self::new(|text, lang| format!("{} [{}]", text, lang))
    }

    /// Uppercase every string
    pub fn uppercase() -> Self {
        Self::new(|text, _| text.to_uppercase())
    }

    /// Return the input unchanged
    pub fn identity() -> Self {
        Self::new(|text, _| text.to_string())
    }

    /// Texts passed to the translator so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl Translator for RecordingTranslator {
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        Ok((self.transform)(text, target))
    }
}

/// Translator that fails every call with a clone of `error`
pub struct FailingTranslator {
    error: TranslationError,
}

impl FailingTranslator {
    /// Fail with `error`
    pub fn new(error: TranslationError) -> Self {
        Self { error }
    }

    /// Fail with a retryable network error
    pub fn offline() -> Self {
        Self::new(TranslationError::Network("connection refused".to_string()))
    }
}

impl Translator for FailingTranslator {
    fn translate(&self, _text: &str, _target: &LanguageCode) -> Result<String, TranslationError> {
        Err(self.error.clone())
    }
}

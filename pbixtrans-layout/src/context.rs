//! Per-run translation context handed to visual handlers

use crate::port::Translator;
use pbixtrans_format::{LanguageCode, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Fragment counters accumulated during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FragmentStats {
    /// Strings sent to the translator and written back
    pub translated: usize,
    /// Empty or whitespace-only strings left untouched
    pub skipped_blank: usize,
}

/// Target language plus the translator, shared by every handler in a run.
///
/// All text goes through [`TranslationContext::translate`], which never calls
/// the translator with blank input and always passes the trimmed text.
pub struct TranslationContext<'t> {
    translator: &'t dyn Translator,
    language: &'t LanguageCode,
    stats: FragmentStats,
}

impl<'t> TranslationContext<'t> {
    /// Create a context for one traversal.
    pub fn new(translator: &'t dyn Translator, language: &'t LanguageCode) -> Self {
        Self {
            translator,
            language,
            stats: FragmentStats::default(),
        }
    }

    /// Target language.
    pub fn language(&self) -> &LanguageCode {
        self.language
    }

    /// Counters so far.
    pub fn stats(&self) -> FragmentStats {
        self.stats
    }

    /// Translate `original`, or return `None` when it is blank.
    ///
    /// `origin` names the element kind for logging.
    pub fn translate(&mut self, origin: &str, original: &str) -> Result<Option<String>> {
        let trimmed = original.trim();
        if trimmed.is_empty() {
            self.stats.skipped_blank += 1;
            return Ok(None);
        }

        let translated = self.translator.translate(trimmed, self.language)?;
        debug!(origin, from = trimmed, to = %translated, "translated");
        self.stats.translated += 1;
        Ok(Some(translated))
    }

    /// Translate a string slot in place. Non-string and missing slots are ignored.
    ///
    /// Returns whether the slot was replaced.
    pub fn translate_slot(&mut self, origin: &str, slot: Option<&mut Value>) -> Result<bool> {
        let Some(slot) = slot else {
            return Ok(false);
        };
        let Some(original) = slot.as_str() else {
            return Ok(false);
        };

        match self.translate(origin, original)? {
            Some(translated) => {
                *slot = Value::String(translated);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

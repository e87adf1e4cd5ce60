//! Translation port
//!
//! The engine depends only on the [`Translator`] trait. Concrete providers
//! (HTTP services, glossaries, test stubs) live outside this crate and are
//! injected when the engine is constructed.

use pbixtrans_format::{LanguageCode, TranslationError};
use std::time::Duration;
use tracing::warn;

/// Text translation capability.
///
/// `text` is always non-empty and already trimmed.
pub trait Translator {
    /// Translate `text` into `target`.
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError> {
        (**self).translate(text, target)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError> {
        (**self).translate(text, target)
    }
}

/// Adapter turning a closure into a [`Translator`].
pub struct FnTranslator<F>(F);

/// Build a [`Translator`] from a closure.
pub fn from_fn<F>(f: F) -> FnTranslator<F>
where
    F: Fn(&str, &LanguageCode) -> Result<String, TranslationError>,
{
    FnTranslator(f)
}

impl<F> Translator for FnTranslator<F>
where
    F: Fn(&str, &LanguageCode) -> Result<String, TranslationError>,
{
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError> {
        (self.0)(text, target)
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first (0 is treated as 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Wraps a translator with [`RetryPolicy`].
///
/// Retryable errors are retried until the policy is exhausted; anything else
/// is returned immediately.
pub struct RetryingTranslator<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Translator> RetryingTranslator<T> {
    /// Wrap `inner`.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Unwrap the inner translator.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Translator> Translator for RetryingTranslator<T> {
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, TranslationError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.translate(text, target) {
                Ok(translated) => return Ok(translated),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= attempts => {
                    if attempts == 1 {
                        return Err(err);
                    }
                    return Err(TranslationError::RetriesExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "translation failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

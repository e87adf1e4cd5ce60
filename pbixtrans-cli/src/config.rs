//! Provider and retry settings
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags:
//!
//! ```toml
//! [provider]
//! kind = "libretranslate"
//! endpoint = "http://localhost:5000"
//! source = "auto"
//! timeout_secs = 30
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 500
//! max_backoff_ms = 8000
//! ```

use clap::ValueEnum;
use pbixtrans_format::{PbixError, Result};
use pbixtrans_layout::RetryPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default LibreTranslate endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Translation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// LibreTranslate-compatible HTTP service
    #[default]
    #[value(name = "libretranslate")]
    LibreTranslate,
    /// Local TOML glossary
    Glossary,
}

/// `[provider]` table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Backend
    pub kind: Option<ProviderKind>,
    /// Service base URL
    pub endpoint: Option<String>,
    /// Service API key
    pub api_key: Option<String>,
    /// Source language sent to the service
    pub source: Option<String>,
    /// Request timeout
    pub timeout_secs: Option<u64>,
    /// Glossary file
    pub glossary: Option<PathBuf>,
    /// Fail on strings missing from the glossary
    pub strict: Option<bool>,
}

/// `[retry]` table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per string
    pub max_attempts: Option<u32>,
    /// First backoff delay in milliseconds
    pub initial_backoff_ms: Option<u64>,
    /// Backoff cap in milliseconds
    pub max_backoff_ms: Option<u64>,
}

/// Contents of a config file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Provider settings
    pub provider: ProviderConfig,
    /// Retry settings
    pub retry: RetryConfig,
}

impl Config {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| PbixError::Config(err.to_string()))
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| PbixError::Config(format!("cannot read {}: {}", path.display(), err)))?;
        Self::parse(&text)
    }

    /// Apply command-line overrides and fill in defaults.
    pub fn resolve(self, overrides: Overrides) -> Result<Settings> {
        let provider = self.provider;
        let kind = overrides.provider.or(provider.kind).unwrap_or_default();
        let glossary = overrides.glossary.or(provider.glossary);
        if kind == ProviderKind::Glossary && glossary.is_none() {
            return Err(PbixError::Config(
                "the glossary provider needs a glossary file (--glossary or provider.glossary)".to_string(),
            ));
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: overrides
                .retries
                .or(self.retry.max_attempts)
                .unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry
                .initial_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            max_backoff: self
                .retry
                .max_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
        };
        if retry.max_attempts == 0 {
            return Err(PbixError::Config("retry attempts must be at least 1".to_string()));
        }

        Ok(Settings {
            kind,
            endpoint: overrides
                .endpoint
                .or(provider.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: overrides.api_key.or(provider.api_key),
            source: overrides
                .source
                .or(provider.source)
                .unwrap_or_else(|| "auto".to_string()),
            timeout: Duration::from_secs(provider.timeout_secs.unwrap_or(30)),
            glossary,
            strict: overrides.strict || provider.strict.unwrap_or(false),
            retry,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--provider`
    pub provider: Option<ProviderKind>,
    /// `--endpoint`
    pub endpoint: Option<String>,
    /// `--api-key`
    pub api_key: Option<String>,
    /// `--source-lang`
    pub source: Option<String>,
    /// `--glossary`
    pub glossary: Option<PathBuf>,
    /// `--strict`
    pub strict: bool,
    /// `--retries`
    pub retries: Option<u32>,
}

/// Fully resolved provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Backend
    pub kind: ProviderKind,
    /// Service base URL
    pub endpoint: String,
    /// Service API key
    pub api_key: Option<String>,
    /// Source language sent to the service
    pub source: String,
    /// Request timeout
    pub timeout: Duration,
    /// Glossary file
    pub glossary: Option<PathBuf>,
    /// Fail on strings missing from the glossary
    pub strict: bool,
    /// Retry policy around the provider
    pub retry: RetryPolicy,
}

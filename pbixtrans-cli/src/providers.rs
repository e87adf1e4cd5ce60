//! Translation providers
//!
//! - [`LibreTranslate`]: blocking HTTP client for a LibreTranslate-compatible
//!   `/translate` endpoint
//! - [`Glossary`]: fixed translations loaded from a TOML file, one table per
//!   target language

use crate::config::{ProviderKind, Settings};
use pbixtrans_format::{LanguageCode, PbixError, Result, TranslationError};
use pbixtrans_layout::Translator;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Build the provider described by `settings`.
pub fn build(settings: &Settings) -> Result<Box<dyn Translator>> {
    match settings.kind {
        ProviderKind::LibreTranslate => Ok(Box::new(LibreTranslate::new(
            &settings.endpoint,
            settings.api_key.clone(),
            &settings.source,
            settings.timeout,
        ))),
        ProviderKind::Glossary => {
            let path = settings
                .glossary
                .as_deref()
                .ok_or_else(|| PbixError::Config("no glossary file configured".to_string()))?;
            Ok(Box::new(Glossary::load(path, settings.strict)?))
        }
    }
}

/// LibreTranslate-compatible HTTP client.
pub struct LibreTranslate {
    agent: ureq::Agent,
    url: String,
    api_key: Option<String>,
    source: String,
}

impl LibreTranslate {
    /// Client for the service at `endpoint` (base URL, without `/translate`).
    pub fn new(endpoint: &str, api_key: Option<String>, source: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("pbixtrans/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            url: format!("{}/translate", endpoint.trim_end_matches('/')),
            api_key,
            source: source.to_string(),
        }
    }

    /// Full request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, text: &str, target: &LanguageCode) -> Value {
        let mut body = json!({
            "q": text,
            "source": self.source,
            "target": target.as_str(),
            "format": "text"
        });
        if let (Some(key), Some(map)) = (&self.api_key, body.as_object_mut()) {
            map.insert("api_key".to_string(), Value::String(key.clone()));
        }
        body
    }
}

impl Translator for LibreTranslate {
    fn translate(&self, text: &str, target: &LanguageCode) -> std::result::Result<String, TranslationError> {
        let body = self.request_body(text, target).to_string();
        debug!(url = %self.url(), target = %target, "requesting translation");

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(&body)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => TranslationError::Http {
                    status,
                    message: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(transport) => TranslationError::Network(transport.to_string()),
            })?;

        let payload = response
            .into_string()
            .map_err(|err| TranslationError::Network(err.to_string()))?;
        parse_response(&payload)
    }
}

/// Extract `translatedText` from a `/translate` response body.
pub fn parse_response(payload: &str) -> std::result::Result<String, TranslationError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| TranslationError::InvalidResponse(err.to_string()))?;
    value
        .get("translatedText")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| TranslationError::InvalidResponse(format!("missing translatedText in {}", payload)))
}

/// Translations looked up in a TOML glossary.
///
/// ```toml
/// [de]
/// "Sales overview" = "Verkaufsübersicht"
///
/// [fr]
/// "Sales overview" = "Aperçu des ventes"
/// ```
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: BTreeMap<String, BTreeMap<String, String>>,
    strict: bool,
}

impl Glossary {
    /// Parse glossary text. Language tables are matched case-insensitively.
    pub fn parse(text: &str, strict: bool) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, String>> =
            toml::from_str(text).map_err(|err| PbixError::Config(format!("invalid glossary: {}", err)))?;
        let entries = raw
            .into_iter()
            .map(|(language, terms)| (language.trim().to_ascii_lowercase(), terms))
            .collect::<BTreeMap<_, _>>();
        debug!(languages = entries.len(), strict, "loaded glossary");
        Ok(Self { entries, strict })
    }

    /// Read and parse a glossary file.
    pub fn load(path: &Path, strict: bool) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| PbixError::Config(format!("cannot read glossary {}: {}", path.display(), err)))?;
        Self::parse(&text, strict)
    }
}

impl Translator for Glossary {
    fn translate(&self, text: &str, target: &LanguageCode) -> std::result::Result<String, TranslationError> {
        let found = self
            .entries
            .get(target.as_str())
            .and_then(|terms| terms.get(text));
        match found {
            Some(translated) => Ok(translated.clone()),
            None if self.strict => Err(TranslationError::Unsupported(format!(
                "no glossary entry for '{}' in '{}'",
                text, target
            ))),
            None => {
                warn!(text, target = %target, "no glossary entry, keeping original text");
                Ok(text.to_string())
            }
        }
    }
}

//! pbixtrans Format - Core primitives for PBIX report translation
//!
//! This crate provides the building blocks shared by the layout engine and the
//! package I/O layer, with no filesystem dependencies:
//!
//! - Package and layout constants
//! - Error types
//! - UTF-16LE text codec
//! - Canonical compact JSON encoding
//! - Target language codes

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod canonical;
pub mod constants;
pub mod error;
pub mod language;
pub mod text;

// Re-export commonly used types
pub use error::{ErrorKind, PbixError, Result, TranslationError};
pub use language::LanguageCode;

use serde_json::Value;

/// Decode raw `Report/Layout` bytes into a JSON value.
pub fn decode_layout(bytes: &[u8]) -> Result<Value> {
    let text = text::decode_utf16le(bytes)?;
    canonical::decode(&text)
}

/// Encode a JSON value as raw `Report/Layout` bytes.
pub fn encode_layout(value: &Value) -> Result<Vec<u8>> {
    let text = canonical::encode(value)?;
    Ok(text::encode_utf16le(&text))
}

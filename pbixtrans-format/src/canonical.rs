//! Canonical compact JSON
//!
//! Both the layout document and every embedded visual `config` string use the
//! same form: no whitespace between tokens, object keys in their original
//! order, numbers in their original textual form and non-ASCII characters
//! written literally. `serde_json` is built with `preserve_order` and
//! `arbitrary_precision` so that a parse/encode cycle keeps all three.

use crate::error::Result;
use serde_json::Value;

/// Parse JSON text.
pub fn decode(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a value in canonical compact form.
pub fn encode(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

//! UTF-16LE text codec for the layout document
//!
//! The layout member is stored as UTF-16 little-endian without a byte-order
//! mark. Decoding is strict: odd byte counts and unpaired surrogates are
//! errors rather than replacement characters, and a leading BOM is kept as
//! text (it then fails JSON parsing, which is how the consuming application
//! treats it too).

use crate::error::{PbixError, Result};
use encoding_rs::UTF_16LE;

/// Decode UTF-16LE bytes into a string.
pub fn decode_utf16le(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(PbixError::InvalidEncoding(format!(
            "UTF-16LE input has odd length {}",
            bytes.len()
        )));
    }

    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            PbixError::InvalidEncoding("UTF-16LE input contains unpaired surrogates".to_string())
        })
}

/// Encode a string as UTF-16LE bytes (no BOM).
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

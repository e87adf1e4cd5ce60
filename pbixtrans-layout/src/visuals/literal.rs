//! Shape and action button visuals
//!
//! Both keep their label in `objects.text[*].properties.text.expr.Literal.Value`
//! as a query-language string literal: the text wrapped in single quotes, with
//! embedded quotes doubled (`'It''s'`). Literals of other types (`1D`, `true`)
//! are not text and are left alone.

use crate::context::TranslationContext;
use crate::document::SingleVisual;
use crate::nested;
use crate::registry::VisualHandler;
use pbixtrans_format::constants::LITERAL_QUOTE;
use pbixtrans_format::Result;
use serde_json::Value;

/// Handler for visuals whose text is a quoted literal expression.
#[derive(Debug, Clone, Copy)]
pub struct LiteralTextHandler {
    origin: &'static str,
}

impl LiteralTextHandler {
    /// Handler that logs fragments under `origin` (the visual tag).
    pub const fn new(origin: &'static str) -> Self {
        Self { origin }
    }
}

impl VisualHandler for LiteralTextHandler {
    fn handle(&self, visual: &mut SingleVisual<'_>, ctx: &mut TranslationContext<'_>) -> Result<()> {
        for text_object in visual.object_entries_mut("text") {
            let Some(literal) = nested::descend(text_object, &["properties", "text", "expr", "Literal"])
            else {
                continue;
            };
            let inner = match literal.get("Value") {
                Some(Value::String(raw)) => unquote(raw),
                _ => None,
            };
            let Some(inner) = inner else {
                continue;
            };

            if let Some(translated) = ctx.translate(self.origin, &inner)? {
                literal.insert("Value".to_string(), Value::String(quote(&translated)));
            }
        }
        Ok(())
    }
}

/// Strip exactly one quote from each end and undo quote doubling.
///
/// Returns `None` for values that are not quoted text, and for values made
/// only of quote characters.
pub fn unquote(raw: &str) -> Option<String> {
    if raw.chars().all(|c| c == LITERAL_QUOTE) {
        return None;
    }
    let inner = raw.strip_prefix(LITERAL_QUOTE)?.strip_suffix(LITERAL_QUOTE)?;
    Some(inner.replace("''", "'"))
}

/// Wrap text in quotes, doubling embedded quotes.
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

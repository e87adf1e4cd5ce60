//! Text box visuals
//!
//! Text lives in `objects.general[*].properties.paragraphs[*].textRuns[*].value`.
//! Each run is translated on its own, so formatting boundaries between runs
//! are kept.

use crate::context::TranslationContext;
use crate::document::SingleVisual;
use crate::nested;
use crate::registry::VisualHandler;
use pbixtrans_format::constants::VISUAL_TEXTBOX;
use pbixtrans_format::Result;

/// Handler for `textbox` visuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextboxHandler;

impl VisualHandler for TextboxHandler {
    fn handle(&self, visual: &mut SingleVisual<'_>, ctx: &mut TranslationContext<'_>) -> Result<()> {
        for general in visual.object_entries_mut("general") {
            let paragraphs = nested::descend(general, &["properties"])
                .and_then(|properties| properties.get_mut("paragraphs"));
            for paragraph in nested::objects_in(paragraphs) {
                for run in nested::objects_in(paragraph.get_mut("textRuns")) {
                    ctx.translate_slot(VISUAL_TEXTBOX, run.get_mut("value"))?;
                }
            }
        }
        Ok(())
    }
}

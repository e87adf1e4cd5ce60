//! Slicer visuals
//!
//! A slicer shows one header per column. When the visual already carries
//! `columnProperties` (column key -> `{displayName}`), those names are
//! translated in place. Otherwise the mapping is built from
//! `prototypeQuery.Select`, using each entry's `Name` as key and its
//! translated `Column.Property` as display name. The two strategies never
//! mix: a visual with some `columnProperties` does not get the remaining
//! columns derived.

use crate::context::TranslationContext;
use crate::document::SingleVisual;
use crate::registry::VisualHandler;
use pbixtrans_format::constants::VISUAL_SLICER;
use pbixtrans_format::Result;
use serde_json::{Map, Value};

const COLUMN_PROPERTIES: &str = "columnProperties";
const DISPLAY_NAME: &str = "displayName";

/// Handler for `slicer` visuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlicerHandler;

impl VisualHandler for SlicerHandler {
    fn handle(&self, visual: &mut SingleVisual<'_>, ctx: &mut TranslationContext<'_>) -> Result<()> {
        let has_columns = matches!(
            visual.get(COLUMN_PROPERTIES),
            Some(Value::Object(columns)) if !columns.is_empty()
        );

        if has_columns {
            let columns = visual
                .get_mut(COLUMN_PROPERTIES)
                .and_then(Value::as_object_mut)
                .into_iter()
                .flat_map(|columns| columns.values_mut());
            for column in columns.filter_map(Value::as_object_mut) {
                ctx.translate_slot(VISUAL_SLICER, column.get_mut(DISPLAY_NAME))?;
            }
        } else {
            let derived = derive_column_properties(visual, ctx)?;
            visual.insert(COLUMN_PROPERTIES, Value::Object(derived));
        }
        Ok(())
    }
}

fn derive_column_properties(
    visual: &SingleVisual<'_>,
    ctx: &mut TranslationContext<'_>,
) -> Result<Map<String, Value>> {
    let mut derived = Map::new();
    let select = visual
        .get("prototypeQuery")
        .and_then(|query| query.get("Select"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for item in select {
        let name = item.get("Name").and_then(Value::as_str);
        let property = item
            .get("Column")
            .and_then(|column| column.get("Property"))
            .and_then(Value::as_str);
        let (Some(name), Some(property)) = (name, property) else {
            continue;
        };

        let display = ctx
            .translate(VISUAL_SLICER, property)?
            .unwrap_or_else(|| property.to_string());
        let mut entry = Map::new();
        entry.insert(DISPLAY_NAME.to_string(), Value::String(display));
        derived.insert(name.to_string(), Value::Object(entry));
    }
    Ok(derived)
}

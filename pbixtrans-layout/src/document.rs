//! Typed views over the layout document
//!
//! The layout is kept as a single `serde_json::Value` so that every key the
//! report carries survives the round trip in its original order. Sections,
//! visual containers and single visuals are exposed as short-lived views that
//! borrow the part of the tree they describe.
//!
//! The `config` attribute of a visual container holds JSON text. It is decoded
//! and re-encoded only through [`VisualContainer::decode_config`] and
//! [`VisualContainer::store_config`].

use crate::nested;
use pbixtrans_format::constants::{
    KEY_CONFIG, KEY_DISPLAY_NAME, KEY_NAME, KEY_SECTIONS, KEY_SINGLE_VISUAL,
    KEY_VISUAL_CONTAINERS, KEY_VISUAL_TYPE,
};
use pbixtrans_format::{canonical, decode_layout, encode_layout, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Parsed `Report/Layout` document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap an already parsed layout value.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse raw UTF-16LE layout bytes.
    pub fn from_layout_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_value(decode_layout(bytes)?))
    }

    /// Serialize to raw UTF-16LE layout bytes in canonical compact form.
    pub fn to_layout_bytes(&self) -> Result<Vec<u8>> {
        encode_layout(&self.root)
    }

    /// Serialize to canonical compact JSON text.
    pub fn to_canonical_string(&self) -> Result<String> {
        canonical::encode(&self.root)
    }

    /// Borrow the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consume the document and return the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Number of section records in the document.
    pub fn section_count(&self) -> usize {
        self.root
            .get(KEY_SECTIONS)
            .and_then(Value::as_array)
            .map(|sections| sections.iter().filter(|s| s.is_object()).count())
            .unwrap_or(0)
    }

    /// Iterate sections in document order.
    pub fn sections_mut(&mut self) -> impl Iterator<Item = Section<'_>> {
        nested::objects_in(self.root.get_mut(KEY_SECTIONS)).map(Section::new)
    }

    /// Summarize pages and visuals without modifying anything.
    pub fn outline(&self) -> Result<Vec<SectionOutline>> {
        let sections = self
            .root
            .get(KEY_SECTIONS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut outline = Vec::with_capacity(sections.len());
        for section in sections.iter().filter_map(Value::as_object) {
            let containers = section
                .get(KEY_VISUAL_CONTAINERS)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut visuals = Vec::with_capacity(containers.len());
            for container in containers.iter().filter_map(Value::as_object) {
                let decoded = match container.get(KEY_CONFIG) {
                    Some(raw) => decode_config_value(raw)?,
                    None => None,
                };
                visuals.push(VisualOutline {
                    visual_type: decoded
                        .as_ref()
                        .and_then(|config| config.visual_type())
                        .map(str::to_owned),
                    config_encoding: decoded.map(|config| config.encoding),
                });
            }

            outline.push(SectionOutline {
                name: string_field(section, KEY_NAME),
                display_name: string_field(section, KEY_DISPLAY_NAME),
                visuals,
            });
        }
        Ok(outline)
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// One report page.
#[derive(Debug)]
pub struct Section<'a> {
    fields: &'a mut Map<String, Value>,
}

impl<'a> Section<'a> {
    /// Wrap a section record.
    pub fn new(fields: &'a mut Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Internal page identifier, if any.
    pub fn name(&self) -> Option<&str> {
        self.fields.get(KEY_NAME).and_then(Value::as_str)
    }

    /// Page title, when present and a string.
    pub fn display_name(&self) -> Option<&str> {
        self.fields.get(KEY_DISPLAY_NAME).and_then(Value::as_str)
    }

    /// Replace the page title. Has no effect when the section has none.
    pub fn set_display_name(&mut self, value: String) {
        if let Some(slot) = self.fields.get_mut(KEY_DISPLAY_NAME) {
            *slot = Value::String(value);
        }
    }

    /// Iterate the section's visual containers in document order.
    pub fn visual_containers(&mut self) -> impl Iterator<Item = VisualContainer<'_>> {
        nested::objects_in(self.fields.get_mut(KEY_VISUAL_CONTAINERS)).map(VisualContainer::new)
    }
}

/// How a container's `config` was stored before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigEncoding {
    /// JSON text inside a string (the normal on-disk form).
    Encoded,
    /// Already a JSON object.
    Structured,
}

/// Decoded configuration of one visual container.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualConfig {
    value: Value,
    encoding: ConfigEncoding,
}

impl VisualConfig {
    /// How the configuration was stored.
    pub fn encoding(&self) -> ConfigEncoding {
        self.encoding
    }

    /// `singleVisual.visualType`, if present.
    pub fn visual_type(&self) -> Option<&str> {
        self.value
            .get(KEY_SINGLE_VISUAL)
            .and_then(|visual| visual.get(KEY_VISUAL_TYPE))
            .and_then(Value::as_str)
    }

    /// Mutable view of `singleVisual`, if it is an object.
    pub fn single_visual_mut(&mut self) -> Option<SingleVisual<'_>> {
        self.value
            .get_mut(KEY_SINGLE_VISUAL)
            .and_then(Value::as_object_mut)
            .map(SingleVisual::new)
    }

    /// Borrow the decoded configuration.
    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

fn decode_config_value(raw: &Value) -> Result<Option<VisualConfig>> {
    match raw {
        Value::String(text) => Ok(Some(VisualConfig {
            value: canonical::decode(text)?,
            encoding: ConfigEncoding::Encoded,
        })),
        Value::Object(_) => Ok(Some(VisualConfig {
            value: raw.clone(),
            encoding: ConfigEncoding::Structured,
        })),
        _ => Ok(None),
    }
}

/// One visual's wrapper record inside a section.
#[derive(Debug)]
pub struct VisualContainer<'a> {
    fields: &'a mut Map<String, Value>,
}

impl<'a> VisualContainer<'a> {
    /// Wrap a visual container record.
    pub fn new(fields: &'a mut Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw `config` attribute.
    pub fn raw_config(&self) -> Option<&Value> {
        self.fields.get(KEY_CONFIG)
    }

    /// Decode `config`.
    ///
    /// Returns `None` when the container has no `config` or it is neither a
    /// string nor an object.
    pub fn decode_config(&self) -> Result<Option<VisualConfig>> {
        match self.fields.get(KEY_CONFIG) {
            Some(raw) => decode_config_value(raw),
            None => Ok(None),
        }
    }

    /// Re-encode `config` as canonical compact JSON text.
    pub fn store_config(&mut self, config: &VisualConfig) -> Result<()> {
        let encoded = canonical::encode(&config.value)?;
        self.fields
            .insert(KEY_CONFIG.to_string(), Value::String(encoded));
        Ok(())
    }
}

/// Mutable view of a decoded `singleVisual` object.
#[derive(Debug)]
pub struct SingleVisual<'a> {
    fields: &'a mut Map<String, Value>,
}

impl<'a> SingleVisual<'a> {
    /// Wrap a `singleVisual` object.
    pub fn new(fields: &'a mut Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Dispatch tag.
    pub fn visual_type(&self) -> Option<&str> {
        self.fields.get(KEY_VISUAL_TYPE).and_then(Value::as_str)
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a top-level key mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Insert or replace a top-level key, keeping its position if it existed.
    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.fields.insert(key.to_string(), value)
    }

    /// Iterate the object entries of `objects.<name>[*]`.
    pub fn object_entries_mut(&mut self, name: &str) -> impl Iterator<Item = &mut Map<String, Value>> {
        let list = nested::descend(self.fields, &["objects"]).and_then(|objects| objects.get_mut(name));
        nested::objects_in(list)
    }

    /// Borrow the raw object.
    pub fn as_map(&self) -> &Map<String, Value> {
        self.fields
    }
}

/// Read-only summary of one section, produced by [`Document::outline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutline {
    /// Internal page identifier
    pub name: Option<String>,
    /// Page title
    pub display_name: Option<String>,
    /// Visuals in document order
    pub visuals: Vec<VisualOutline>,
}

/// Read-only summary of one visual container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualOutline {
    /// `singleVisual.visualType`, when the container has one
    pub visual_type: Option<String>,
    /// How `config` was stored, `None` when the container has no config
    pub config_encoding: Option<ConfigEncoding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(json!({
            "id": 0,
            "sections": [
                {
                    "name": "ReportSection",
                    "displayName": "Overview",
                    "visualContainers": [
                        {"x": 1, "config": "{\"name\":\"a\",\"singleVisual\":{\"visualType\":\"textbox\"}}"},
                        {"config": {"singleVisual": {"visualType": "card"}}},
                        {"x": 3}
                    ]
                },
                {"name": "Empty"},
                "not a section"
            ]
        }))
    }

    #[test]
    fn test_sections_skip_non_objects() {
        let mut doc = sample();
        assert_eq!(doc.section_count(), 2);
        let names: Vec<_> = doc
            .sections_mut()
            .map(|s| s.name().map(str::to_owned))
            .collect();
        assert_eq!(
            names,
            vec![Some("ReportSection".to_string()), Some("Empty".to_string())]
        );
    }

    #[test]
    fn test_set_display_name_never_synthesizes() {
        let mut doc = sample();
        for mut section in doc.sections_mut() {
            section.set_display_name("X".to_string());
        }
        let sections = doc.as_value()["sections"].as_array().unwrap();
        assert_eq!(sections[0]["displayName"], "X");
        assert!(sections[1].get("displayName").is_none());
    }

    #[test]
    fn test_decode_config_variants() {
        let mut doc = sample();
        let mut section = doc.sections_mut().next().unwrap();
        let configs: Vec<_> = section
            .visual_containers()
            .map(|c| c.decode_config().unwrap())
            .collect();

        let first = configs[0].as_ref().unwrap();
        assert_eq!(first.encoding(), ConfigEncoding::Encoded);
        assert_eq!(first.visual_type(), Some("textbox"));

        let second = configs[1].as_ref().unwrap();
        assert_eq!(second.encoding(), ConfigEncoding::Structured);
        assert_eq!(second.visual_type(), Some("card"));

        assert!(configs[2].is_none());
    }

    #[test]
    fn test_store_config_is_compact_and_in_place() {
        let mut doc = Document::from_value(json!({
            "sections": [{"visualContainers": [{"x": 1, "config": "{ \"b\": 1, \"a\": \"é\" }", "y": 2}]}]
        }));
        {
            let mut section = doc.sections_mut().next().unwrap();
            let mut container = section.visual_containers().next().unwrap();
            let config = container.decode_config().unwrap().unwrap();
            container.store_config(&config).unwrap();
        }
        assert_eq!(
            doc.to_canonical_string().unwrap(),
            r#"{"sections":[{"visualContainers":[{"x":1,"config":"{\"b\":1,\"a\":\"é\"}","y":2}]}]}"#
        );
    }

    #[test]
    fn test_invalid_config_json_is_parse_error() {
        let mut doc = Document::from_value(json!({
            "sections": [{"visualContainers": [{"config": "{broken"}]}]
        }));
        let mut section = doc.sections_mut().next().unwrap();
        let container = section.visual_containers().next().unwrap();
        let err = container.decode_config().unwrap_err();
        assert_eq!(err.kind(), pbixtrans_format::ErrorKind::Parse);
    }

    #[test]
    fn test_outline() {
        let outline = sample().outline().unwrap();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].display_name.as_deref(), Some("Overview"));
        assert_eq!(outline[0].visuals.len(), 3);
        assert_eq!(outline[0].visuals[0].visual_type.as_deref(), Some("textbox"));
        assert_eq!(outline[0].visuals[1].config_encoding, Some(ConfigEncoding::Structured));
        assert_eq!(outline[0].visuals[2].config_encoding, None);
        assert!(outline[1].visuals.is_empty());
    }

    #[test]
    fn test_object_entries_missing_objects() {
        let mut map = Map::new();
        map.insert("visualType".into(), json!("textbox"));
        let mut visual = SingleVisual::new(&mut map);
        assert_eq!(visual.object_entries_mut("general").count(), 0);
    }
}

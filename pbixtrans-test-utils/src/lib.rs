//! pbixtrans Test Utilities
//!
//! This crate provides shared testing utilities and helpers for the pbixtrans
//! project: layout and visual fixture builders, package writers/readers and
//! stub translators.

use serde_json::{json, Map, Value};

pub mod package;
pub mod translators;

pub use package::{layout_bytes, read_package, sample_members, sample_package, write_package};
pub use translators::{FailingTranslator, RecordingTranslator};

/// Builder for a `Report/Layout` document
pub struct LayoutBuilder {
    sections: Vec<Value>,
}

impl LayoutBuilder {
    /// Create an empty layout
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Add a section
    pub fn section(mut self, section: SectionBuilder) -> Self {
        self.sections.push(section.build());
        self
    }

    /// Add a raw section value
    pub fn raw_section(mut self, section: Value) -> Self {
        self.sections.push(section);
        self
    }

    /// Build the layout
    pub fn build(self) -> Value {
        json!({
            "id": 0,
            "resourcePackages": [],
            "sections": self.sections,
            "config": "{\"version\":\"5.43\",\"themeCollection\":{}}",
            "layoutOptimization": 0
        })
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one report page
pub struct SectionBuilder {
    fields: Map<String, Value>,
    containers: Vec<Value>,
}

impl SectionBuilder {
    /// Section with the given internal name
    pub fn new(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        Self {
            fields,
            containers: Vec::new(),
        }
    }

    /// Set the page title
    pub fn display_name(mut self, title: &str) -> Self {
        self.fields
            .insert("displayName".to_string(), Value::String(title.to_string()));
        self
    }

    /// Add a container whose `config` is the encoded form of `config`
    pub fn visual(mut self, config: Value) -> Self {
        let position = self.containers.len();
        self.containers.push(json!({
            "x": 10.5 * position as f64,
            "y": 20,
            "z": position,
            "width": 300,
            "height": 120,
            "config": config.to_string(),
            "filters": "[]"
        }));
        self
    }

    /// Add a raw container value
    pub fn raw_container(mut self, container: Value) -> Self {
        self.containers.push(container);
        self
    }

    /// Build the section
    pub fn build(mut self) -> Value {
        self.fields
            .insert("visualContainers".to_string(), Value::Array(self.containers));
        Value::Object(self.fields)
    }
}

/// Visual config fixtures, shaped like the ones Power BI Desktop writes
pub struct Visuals;

impl Visuals {
    fn wrap(name: &str, single_visual: Value) -> Value {
        json!({
            "name": name,
            "layouts": [{"id": 0, "position": {"x": 0, "y": 0, "width": 300, "height": 120}}],
            "singleVisual": single_visual
        })
    }

    /// Text box with one paragraph per entry, one run per string
    pub fn textbox(paragraphs: &[&[&str]]) -> Value {
        let paragraphs: Vec<Value> = paragraphs
            .iter()
            .map(|runs| {
                let runs: Vec<Value> = runs
                    .iter()
                    .map(|text| json!({"value": text, "textStyle": {"fontSize": "14pt"}}))
                    .collect();
                json!({"textRuns": runs})
            })
            .collect();
        Self::wrap(
            "textbox1",
            json!({
                "visualType": "textbox",
                "drillFilterOtherVisuals": true,
                "objects": {"general": [{"properties": {"paragraphs": paragraphs}}]}
            }),
        )
    }

    fn labelled(name: &str, visual_type: &str, literal: &str) -> Value {
        Self::wrap(
            name,
            json!({
                "visualType": visual_type,
                "drillFilterOtherVisuals": true,
                "objects": {"text": [{"properties": {
                    "show": {"expr": {"Literal": {"Value": "true"}}},
                    "text": {"expr": {"Literal": {"Value": literal}}}
                }}]}
            }),
        )
    }

    /// Shape whose label literal is `literal` (quotes included)
    pub fn shape(literal: &str) -> Value {
        Self::labelled("shape1", "shape", literal)
    }

    /// Action button whose label literal is `literal` (quotes included)
    pub fn action_button(literal: &str) -> Value {
        Self::labelled("button1", "actionButton", literal)
    }

    /// Slicer with a `prototypeQuery` selecting `(name, property)` columns
    pub fn slicer_from_query(columns: &[(&str, &str)]) -> Value {
        let select: Vec<Value> = columns
            .iter()
            .map(|(name, property)| {
                json!({
                    "Column": {"Expression": {"SourceRef": {"Source": "s"}}, "Property": property},
                    "Name": name
                })
            })
            .collect();
        Self::wrap(
            "slicer1",
            json!({
                "visualType": "slicer",
                "prototypeQuery": {"Version": 2, "From": [{"Name": "s", "Entity": "Sales", "Type": 0}], "Select": select}
            }),
        )
    }

    /// Slicer with explicit `columnProperties` display names
    pub fn slicer_with_columns(columns: &[(&str, &str)]) -> Value {
        let mut properties = Map::new();
        for (key, display) in columns {
            properties.insert(key.to_string(), json!({"displayName": display}));
        }
        Self::wrap(
            "slicer2",
            json!({
                "visualType": "slicer",
                "columnProperties": properties
            }),
        )
    }

    /// Visual of a kind without a built-in handler
    pub fn other(visual_type: &str, title: &str) -> Value {
        Self::wrap(
            "other1",
            json!({
                "visualType": visual_type,
                "vcObjects": {"title": [{"properties": {"text": {"expr": {"Literal": {"Value": format!("'{}'", title)}}}}}]}
            }),
        )
    }
}

/// Parse the config string of container `container` in section `section`.
pub fn decoded_config(layout: &Value, section: usize, container: usize) -> Value {
    let raw = layout["sections"][section]["visualContainers"][container]["config"]
        .as_str()
        .expect("config should be a string");
    serde_json::from_str(raw).expect("config should be valid JSON")
}

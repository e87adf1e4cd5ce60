//! Constants for the PBIX package and layout document

/// Package file extension (compared case-insensitively).
pub const PACKAGE_EXTENSION: &str = "pbix";

/// Suffix appended to the package stem to name the default extraction directory.
pub const EXTRACT_DIR_SUFFIX: &str = "_extracted";

/// Archive member holding the UTF-16LE layout document.
pub const LAYOUT_MEMBER: &str = "Report/Layout";

/// Archive member that breaks re-import and is dropped on repack.
pub const SECURITY_BINDINGS_MEMBER: &str = "SecurityBindings";

/// Layout key: ordered list of report pages.
pub const KEY_SECTIONS: &str = "sections";
/// Section key: page title shown in the report.
pub const KEY_DISPLAY_NAME: &str = "displayName";
/// Section key: internal page identifier.
pub const KEY_NAME: &str = "name";
/// Section key: ordered list of visual containers.
pub const KEY_VISUAL_CONTAINERS: &str = "visualContainers";
/// Container key: JSON-encoded visual configuration.
pub const KEY_CONFIG: &str = "config";
/// Config key: the visual definition.
pub const KEY_SINGLE_VISUAL: &str = "singleVisual";
/// Visual key: tag used for handler dispatch.
pub const KEY_VISUAL_TYPE: &str = "visualType";

/// Visual tag for text boxes.
pub const VISUAL_TEXTBOX: &str = "textbox";
/// Visual tag for action buttons.
pub const VISUAL_ACTION_BUTTON: &str = "actionButton";
/// Visual tag for shapes.
pub const VISUAL_SHAPE: &str = "shape";
/// Visual tag for slicers.
pub const VISUAL_SLICER: &str = "slicer";

/// Quote that delimits text literals inside visual expressions.
pub const LITERAL_QUOTE: char = '\'';

//! Visual handler registry
//!
//! Maps a `visualType` tag to the handler that knows where that kind of
//! visual keeps its text. The registry is a plain lookup table: the engine
//! asks it for a handler and leaves the visual alone when there is none.
//!
//! # Example
//!
//! ```rust
//! use pbixtrans_layout::registry::{handler_fn, VisualRegistry};
//!
//! let mut registry = VisualRegistry::standard();
//! registry
//!     .register(
//!         "card",
//!         handler_fn(|visual, ctx| {
//!             ctx.translate_slot("card", visual.get_mut("title"))?;
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//! assert!(registry.contains("card"));
//! ```

use crate::context::TranslationContext;
use crate::document::SingleVisual;
use crate::visuals::{LiteralTextHandler, SlicerHandler, TextboxHandler};
use pbixtrans_format::constants::{VISUAL_ACTION_BUTTON, VISUAL_SHAPE, VISUAL_SLICER, VISUAL_TEXTBOX};
use pbixtrans_format::{PbixError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Locates and replaces the translatable text of one kind of visual.
pub trait VisualHandler {
    /// Mutate `visual` in place, translating through `ctx`.
    fn handle(&self, visual: &mut SingleVisual<'_>, ctx: &mut TranslationContext<'_>) -> Result<()>;
}

/// Adapter turning a closure into a [`VisualHandler`].
pub struct FnHandler<F>(F);

/// Build a [`VisualHandler`] from a closure.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut SingleVisual<'_>, &mut TranslationContext<'_>) -> Result<()>,
{
    FnHandler(f)
}

impl<F> VisualHandler for FnHandler<F>
where
    F: Fn(&mut SingleVisual<'_>, &mut TranslationContext<'_>) -> Result<()>,
{
    fn handle(&self, visual: &mut SingleVisual<'_>, ctx: &mut TranslationContext<'_>) -> Result<()> {
        (self.0)(visual, ctx)
    }
}

/// Visual kinds handled out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualKind {
    /// Rich text box
    Textbox,
    /// Button with a text label
    ActionButton,
    /// Shape with a text label
    Shape,
    /// Slicer with column headers
    Slicer,
}

impl VisualKind {
    /// Every built-in kind.
    pub const ALL: [VisualKind; 4] = [
        VisualKind::Textbox,
        VisualKind::ActionButton,
        VisualKind::Shape,
        VisualKind::Slicer,
    ];

    /// `visualType` tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            VisualKind::Textbox => VISUAL_TEXTBOX,
            VisualKind::ActionButton => VISUAL_ACTION_BUTTON,
            VisualKind::Shape => VISUAL_SHAPE,
            VisualKind::Slicer => VISUAL_SLICER,
        }
    }

    /// Parse a `visualType` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Built-in handler for this kind.
    pub fn handler(&self) -> Box<dyn VisualHandler> {
        match self {
            VisualKind::Textbox => Box::new(TextboxHandler),
            VisualKind::ActionButton => Box::new(LiteralTextHandler::new(VISUAL_ACTION_BUTTON)),
            VisualKind::Shape => Box::new(LiteralTextHandler::new(VISUAL_SHAPE)),
            VisualKind::Slicer => Box::new(SlicerHandler),
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lookup table from `visualType` tag to handler.
pub struct VisualRegistry {
    handlers: BTreeMap<String, Box<dyn VisualHandler>>,
}

impl VisualRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registry with a handler for every [`VisualKind`].
    pub fn standard() -> Self {
        let mut handlers = BTreeMap::new();
        for kind in VisualKind::ALL {
            handlers.insert(kind.tag().to_string(), kind.handler());
        }
        Self { handlers }
    }

    /// Register a handler for `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler is already registered for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, handler: impl VisualHandler + 'static) -> Result<()> {
        self.register_boxed(tag, Box::new(handler))
    }

    /// Register an already boxed handler for `tag`.
    pub fn register_boxed(&mut self, tag: impl Into<String>, handler: Box<dyn VisualHandler>) -> Result<()> {
        let tag = tag.into();
        if self.handlers.contains_key(&tag) {
            return Err(PbixError::HandlerAlreadyRegistered(tag));
        }
        self.handlers.insert(tag, handler);
        Ok(())
    }

    /// Remove the handler for `tag`.
    pub fn unregister(&mut self, tag: &str) -> Option<Box<dyn VisualHandler>> {
        self.handlers.remove(tag)
    }

    /// Handler for `tag`, if any.
    pub fn get(&self, tag: &str) -> Option<&dyn VisualHandler> {
        self.handlers.get(tag).map(|handler| handler.as_ref())
    }

    /// Whether `tag` has a handler.
    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for VisualRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for VisualRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualRegistry")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
